use anyhow::Context;
use fx_hga::bootstrap::{bootstrap, read_configuration, read_problem};
use fx_hga::models::Configuration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_GENERATIONS: u64 = 1000;

// Usage: hga <problem.json> [configuration.json] [generations]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_ids(true)
        .init();

    let mut args = std::env::args().skip(1);
    let problem_path = args
        .next()
        .context("Usage: hga <problem.json> [configuration.json] [generations]")?;
    let problem = read_problem(&problem_path)?;
    let configuration = match args.next() {
        Some(path) => read_configuration(path)?,
        None => Configuration::default(),
    };
    let generations = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Invalid generation count: {raw}"))?,
        None => DEFAULT_GENERATIONS,
    };

    let mut orchestrator = bootstrap(problem, configuration)?.build()?;
    info!(
        run_id = %orchestrator.run_id(),
        problem_id = %orchestrator.problem().problem_id,
        generations = generations,
        "Starting optimization"
    );

    let stop = Arc::new(AtomicBool::new(false));
    let signal = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, stopping at the next generation");
            signal.store(true, Ordering::Relaxed);
        }
    });

    let last = tokio::task::spawn_blocking(move || {
        orchestrator.run(generations, &stop, |report| {
            info!(
                generation = report.generation,
                best_distance = ?report.best_distance,
                leaves = report.leaf_count,
                f_beta = report.metrics.f_beta,
                diversity = report.metrics.diversity,
                migrated = report.migrated(),
                "Generation completed"
            );
        })
    })
    .await?;

    if let Some(report) = last {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
