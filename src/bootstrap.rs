use crate::models::{Configuration, Problem};
use crate::services::optimization::{self, Orchestrator, OrchestratorBuilder};
use anyhow::Context;
use std::path::Path;
use tracing::instrument;

/// Validates the inputs and returns a builder ready to create the run.
#[instrument(level = "debug", skip(problem, configuration), fields(problem_id = %problem.problem_id))]
pub fn bootstrap(
    problem: Problem,
    configuration: Configuration,
) -> Result<OrchestratorBuilder, optimization::Error> {
    configuration.validate()?;
    problem.validate()?;

    Ok(Orchestrator::builder(problem).with_configuration(configuration))
}

pub fn read_problem(path: impl AsRef<Path>) -> anyhow::Result<Problem> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read problem from {}", path.display()))?;
    let problem = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse problem in {}", path.display()))?;
    Ok(problem)
}

pub fn read_configuration(path: impl AsRef<Path>) -> anyhow::Result<Configuration> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
    let configuration = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse configuration in {}", path.display()))?;
    Ok(configuration)
}
