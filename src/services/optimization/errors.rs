use crate::models::{ConfigurationError, ProblemError};

/// Errors that can occur while setting up or re-targeting an optimization run.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("ProblemError: {0}")]
    ProblemError(#[from] ProblemError),
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] ConfigurationError),
}
