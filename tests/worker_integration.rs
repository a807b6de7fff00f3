use fx_hga::models::City;
use fx_hga::services::worker::{
    Command, EVENT_CAPACITY, Event, InitMessage, Worker, spawn_worker,
};
use std::time::Duration;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(10);

fn square() -> InitMessage {
    InitMessage {
        city_count: 4,
        salesmen_count: 1,
        coordinates: vec![
            City::new(0, 0.0, 0.0),
            City::new(1, 10.0, 0.0),
            City::new(2, 10.0, 10.0),
            City::new(3, 0.0, 10.0),
        ],
        depot: City::new(0, 0.0, 0.0),
        problem_id: "MSTSP-square".to_string(),
        pop_size: 16,
        ground_truth: None,
        node_id: 1,
    }
}

#[tokio::test]
async fn test_worker_contract_end_to_end() -> anyhow::Result<()> {
    let mut worker = spawn_worker(Worker::new(2)?.with_seed(11));

    worker.send(Command::Init(square()))?;
    let Some(Event::InitDone {
        best_distance: Some(initial),
        best_genome: Some(genome),
    }) = timeout(WAIT, worker.recv()).await?
    else {
        panic!("expected init_done");
    };
    assert_eq!(genome.len(), 4);

    worker.send(Command::Start)?;
    let mut previous = initial;
    for _ in 0..3 {
        let Some(Event::Update {
            best_distance: Some(distance),
            generations,
            ..
        }) = timeout(WAIT, worker.recv()).await?
        else {
            panic!("expected update");
        };
        assert_eq!(generations, 2);
        assert!(distance <= previous);
        previous = distance;
    }

    // the optimal square tour reaches the island at the next batch boundary
    worker.send(Command::MigrateIn {
        migrants: vec![vec![0, 1, 2, 3]],
    })?;
    loop {
        match timeout(WAIT, worker.recv()).await? {
            Some(Event::Update {
                best_distance: Some(distance),
                ..
            }) if distance == 40.0 => break,
            Some(Event::Update { .. }) => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }

    worker.send(Command::Stop)?;
    // drain updates emitted before the stop took effect
    while let Ok(event) = timeout(Duration::from_millis(200), worker.recv()).await {
        assert!(matches!(event, Some(Event::Update { .. })));
    }

    worker.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_worker_reports_commands_before_init_as_failures() -> anyhow::Result<()> {
    let mut worker = spawn_worker(Worker::default());

    worker.send(Command::Start)?;
    let event = timeout(WAIT, worker.recv()).await?;

    assert!(matches!(event, Some(Event::Failed { .. })));
    worker.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_worker_accepts_json_commands() -> anyhow::Result<()> {
    let mut worker = spawn_worker(Worker::new(1)?.with_seed(4));
    let init: Command = serde_json::from_value(serde_json::json!({
        "type": "init",
        "cityCount": 4,
        "evalCities": [
            {"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 10}, {"x": 0, "y": 10}
        ],
        "evalDepot": {"x": 0, "y": 0},
        "problemId": "MSTSP-square",
        "popSize": 8,
        "nodeId": 2
    }))?;

    worker.send(init)?;
    let event = timeout(WAIT, worker.recv()).await?.expect("an event");
    let json = serde_json::to_value(&event)?;

    assert_eq!(json["type"], "init_done");
    assert!(json["bestDistance"].as_f64().is_some());
    worker.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_worker_bounds_unread_updates() -> anyhow::Result<()> {
    let mut worker = spawn_worker(Worker::new(1)?.with_seed(6));

    worker.send(Command::Init(square()))?;
    assert!(matches!(
        timeout(WAIT, worker.recv()).await?,
        Some(Event::InitDone { .. })
    ));

    worker.send(Command::Start)?;
    sleep(Duration::from_millis(300)).await;
    worker.send(Command::Stop)?;

    let mut queued = 0;
    while let Ok(event) = timeout(Duration::from_millis(200), worker.recv()).await {
        assert!(matches!(event, Some(Event::Update { .. })));
        queued += 1;
    }
    assert!(queued > 0);
    assert!(queued <= EVENT_CAPACITY);

    worker.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_worker_batches_leave_the_runtime_responsive() -> anyhow::Result<()> {
    let mut worker = spawn_worker(Worker::new(100)?.with_seed(8));
    let cities: Vec<City> = (0..10)
        .map(|i| City::new(i, (i * 7 % 10) as f64, (i * 3 % 10) as f64))
        .collect();

    worker.send(Command::Init(InitMessage {
        city_count: 10,
        coordinates: cities,
        pop_size: 200,
        ..square()
    }))?;
    assert!(matches!(
        timeout(WAIT, worker.recv()).await?,
        Some(Event::InitDone { .. })
    ));

    worker.send(Command::Start)?;
    // a batch in flight must not keep this current-thread runtime from
    // firing a short timer
    tokio::select! {
        biased;
        event = worker.recv() => panic!("batch finished before the timer: {event:?}"),
        _ = sleep(Duration::from_millis(1)) => {}
    }

    worker.send(Command::Stop)?;
    worker.shutdown().await?;
    Ok(())
}
