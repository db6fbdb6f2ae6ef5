//! Domain error types

use thiserror::Error;

/// An illegal move in a job or suggestion state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The action is not allowed from the current state
    #[error("cannot {action} from '{from}' state")]
    Invalid {
        /// Attempted action
        action: &'static str,
        /// State the entity was in
        from: &'static str,
    },

    /// A progress report would move the processed-chunk counter backward
    #[error("progress regression: chunk {index} reported after {processed} chunks processed")]
    ProgressRegression {
        /// Reported chunk index (0-based)
        index: usize,
        /// Chunks already recorded as processed
        processed: usize,
    },
}

/// A field schema tree that violates the type/fields/items invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field '{path}': {reason}")]
pub struct SchemaViolation {
    /// Dotted path to the offending node (`[]` marks an array item)
    pub path: String,
    /// What is wrong with it
    pub reason: String,
}

impl SchemaViolation {
    pub(crate) fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
