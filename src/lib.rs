pub mod bootstrap;
pub mod models;
pub mod services;

pub use services::optimization::{GenerationReport, Orchestrator};
