//! Error types for job execution

use docsift_domain::TransitionError;
use thiserror::Error;

/// Errors that stop the runner itself
///
/// A failed extraction is not one of these: it is recorded on the job and
/// reported through [`AttemptReport`](crate::AttemptReport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// A referenced job or suggestion does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The record's state machine refused the move
    #[error("Invalid transition: {0}")]
    Transition(#[from] TransitionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (task aborted or panicked)
    #[error("Worker error: {0}")]
    Worker(String),
}
