use crate::models::{ConfigurationError, ProblemError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ProblemError: {0}")]
    ProblemError(#[from] ProblemError),
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    #[error("Worker received {command} before init")]
    NotInitialized { command: &'static str },
    #[error("Worker channel closed")]
    Disconnected,
    #[error("Worker task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
