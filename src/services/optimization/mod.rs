mod errors;
mod report;
mod service;
mod service_builder;

pub use errors::Error;
pub use report::{GenerationReport, IslandSummary};
pub use service::Orchestrator;
pub use service_builder::OrchestratorBuilder;
