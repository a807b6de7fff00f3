use fx_hga::bootstrap::bootstrap;
use fx_hga::models::{City, Configuration, EMPTY_LEG_PENALTY, GroundTruth, Problem};
use std::sync::atomic::AtomicBool;

// Six cities on a regular hexagon of radius 10 around the depot. The optimal
// single-salesman tour leaves the depot for one vertex, walks five sides and
// returns: 10 + 5 * 10 + 10. Dropping any one of the six sides gives a
// distinct optimal edge set.
fn hexagon(salesmen: usize) -> Problem {
    let cities = (0..6)
        .map(|i| {
            let angle = (i as f64 * 60.0).to_radians();
            City::new(i, 10.0 * angle.cos(), 10.0 * angle.sin())
        })
        .collect();
    Problem::new("MSTSP-hexagon", cities, City::new(0, 0.0, 0.0), salesmen)
}

fn configuration(seed: u64) -> Configuration {
    Configuration::default()
        .with_population_size(30)
        .with_migration_interval(5)
        .with_seed(seed)
}

#[test]
fn test_finds_an_optimal_tour_and_scores_it() -> anyhow::Result<()> {
    let problem = hexagon(1).with_ground_truth(GroundTruth::new(70.0, 6));
    let mut orchestrator = bootstrap(problem, configuration(42))?.build()?;
    let stop = AtomicBool::new(false);

    let mut reports = Vec::new();
    orchestrator.run(60, &stop, |report| reports.push(report.clone()));

    let last = reports.last().expect("at least one report");
    assert_eq!(last.generation, 60);
    assert_eq!(last.best_distance, Some(70.0));
    assert!(last.metrics.found_optima >= 1);
    assert_eq!(
        last.metrics.recall,
        last.metrics.found_optima as f64 / 6.0
    );
    assert!(last.metrics.f_beta > 0.0);
    assert_eq!(reports.iter().filter(|r| r.migrated()).count(), 12);

    // found optima only ever accumulate during a run
    for pair in reports.windows(2) {
        assert!(pair[1].metrics.found_optima >= pair[0].metrics.found_optima);
    }
    Ok(())
}

#[test]
fn test_keeps_multi_salesman_tours_free_of_empty_legs() -> anyhow::Result<()> {
    let mut orchestrator = bootstrap(hexagon(2), configuration(7))?.build()?;
    let stop = AtomicBool::new(false);

    let last = orchestrator
        .run(30, &stop, |_| {})
        .expect("at least one report");

    let best = last.best_distance.expect("a best distance");
    assert!(best < EMPTY_LEG_PENALTY);
    let genome = last.best_genome.expect("a best genome");
    assert_eq!(genome.len(), 7);
    assert_eq!(last.metrics.f_beta, 0.0);
    assert_eq!(last.metrics.diversity, 0.0);
    Ok(())
}

#[test]
fn test_serializes_generation_reports() -> anyhow::Result<()> {
    let mut orchestrator = bootstrap(hexagon(1), configuration(3))?.build()?;

    let report = orchestrator.step();
    let json = serde_json::to_value(&report)?;

    assert_eq!(json["generation"], 1);
    assert_eq!(json["leafCount"], 2);
    assert_eq!(json["rootCount"], 1);
    assert!(json["fBeta"].is_number());
    assert!(json["runId"].is_string());
    assert_eq!(json["islands"].as_array().map(Vec::len), Some(3));
    Ok(())
}
