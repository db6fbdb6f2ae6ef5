//! Schema suggestion - an LLM-proposed schema for a document
//!
//! Lifecycle is `pending → processing → {completed | failed}`. Failed
//! attempts with retries left stay in `processing` while the next attempt is
//! scheduled; `retry_pending` tells a scheduled retry apart from an attempt
//! in flight.

use crate::error::TransitionError;
use crate::ids::{DocumentId, SuggestionId};
use crate::schema::SchemaDefinition;
use crate::time::unix_now;
use crate::AttemptOutcome;
use serde::{Deserialize, Serialize};

/// Default number of automatic retries for a suggestion
pub const DEFAULT_SUGGESTION_MAX_RETRIES: u32 = 3;

/// Lifecycle state of a schema suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    /// Waiting for the first attempt
    Pending,
    /// An attempt is running or scheduled
    Processing,
    /// A schema was proposed
    Completed,
    /// Retries exhausted
    Failed,
}

impl SuggestionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Processing => "processing",
            SuggestionStatus::Completed => "completed",
            SuggestionStatus::Failed => "failed",
        }
    }

    /// Whether no further automatic transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, SuggestionStatus::Completed | SuggestionStatus::Failed)
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to propose a schema for one document, and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSuggestion {
    /// Unique identifier
    pub id: SuggestionId,
    /// Document being analyzed
    pub document_id: DocumentId,
    /// Current lifecycle state
    pub status: SuggestionStatus,
    /// Proposed schema name
    pub suggested_name: String,
    /// Proposed schema description
    pub suggested_description: String,
    /// Proposed field tree
    pub suggested_schema: Option<SchemaDefinition>,
    /// Model used for the analysis
    pub llm_model: String,
    /// Message of the most recent failure
    pub error_message: String,
    /// Automatic retries consumed
    pub retry_count: u32,
    /// Automatic retries allowed
    pub max_retries: u32,
    /// A failed attempt is waiting for its retry
    #[serde(default)]
    pub retry_pending: bool,
    /// Creation time (Unix seconds)
    pub created_at: u64,
    /// Completion time (Unix seconds)
    pub completed_at: Option<u64>,
}

impl SchemaSuggestion {
    /// Create a pending suggestion request
    pub fn new(document_id: DocumentId, llm_model: impl Into<String>) -> Self {
        Self {
            id: SuggestionId::new(),
            document_id,
            status: SuggestionStatus::Pending,
            suggested_name: String::new(),
            suggested_description: String::new(),
            suggested_schema: None,
            llm_model: llm_model.into(),
            error_message: String::new(),
            retry_count: 0,
            max_retries: DEFAULT_SUGGESTION_MAX_RETRIES,
            retry_pending: false,
            created_at: unix_now(),
            completed_at: None,
        }
    }

    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether an attempt may start now: the request is new or a retry is
    /// scheduled
    pub fn is_runnable(&self) -> bool {
        match self.status {
            SuggestionStatus::Pending => true,
            SuggestionStatus::Processing => self.retry_pending,
            _ => false,
        }
    }

    /// Start an attempt; allowed from `pending` and from a scheduled retry
    pub fn begin_attempt(&mut self) -> Result<(), TransitionError> {
        if !self.is_runnable() {
            return Err(TransitionError::Invalid {
                action: "begin an attempt",
                from: self.status.as_str(),
            });
        }
        self.status = SuggestionStatus::Processing;
        self.retry_pending = false;
        Ok(())
    }

    /// Store the proposed schema: `processing → completed`
    pub fn complete(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: SchemaDefinition,
    ) -> Result<(), TransitionError> {
        self.expect_processing("complete")?;
        self.status = SuggestionStatus::Completed;
        self.suggested_name = name.into();
        self.suggested_description = description.into();
        self.suggested_schema = Some(schema);
        self.error_message.clear();
        self.completed_at = Some(unix_now());
        Ok(())
    }

    /// Record a failed attempt; stays in `processing` while retries remain
    pub fn fail_attempt(
        &mut self,
        message: impl Into<String>,
    ) -> Result<AttemptOutcome, TransitionError> {
        self.expect_processing("record a failure")?;
        self.error_message = message.into();
        if self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.retry_pending = true;
            Ok(AttemptOutcome::Retry {
                retry_count: self.retry_count,
            })
        } else {
            self.status = SuggestionStatus::Failed;
            Ok(AttemptOutcome::Exhausted)
        }
    }

    /// Fail without consuming retries
    pub fn fail_permanently(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_processing("fail")?;
        self.error_message = message.into();
        self.status = SuggestionStatus::Failed;
        Ok(())
    }

    fn expect_processing(&self, action: &'static str) -> Result<(), TransitionError> {
        if self.status == SuggestionStatus::Processing {
            Ok(())
        } else {
            Err(TransitionError::Invalid {
                action,
                from: self.status.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldNode, FieldType};

    fn suggestion() -> SchemaSuggestion {
        SchemaSuggestion::new(DocumentId::new(), "llama3.1")
    }

    #[test]
    fn test_complete_stores_proposal() {
        let mut s = suggestion();
        s.begin_attempt().unwrap();
        let schema = SchemaDefinition::new(vec![FieldNode::scalar("title", FieldType::String)]);
        s.complete("Invoice", "Invoices", schema.clone()).unwrap();

        assert_eq!(s.status, SuggestionStatus::Completed);
        assert_eq!(s.suggested_name, "Invoice");
        assert_eq!(s.suggested_schema, Some(schema));
        assert!(s.completed_at.is_some());
    }

    #[test]
    fn test_retries_stay_processing() {
        let mut s = suggestion();
        s.begin_attempt().unwrap();
        assert_eq!(
            s.fail_attempt("timeout").unwrap(),
            AttemptOutcome::Retry { retry_count: 1 }
        );
        assert_eq!(s.status, SuggestionStatus::Processing);
        assert!(s.retry_pending);
        assert!(s.begin_attempt().is_ok());
        assert!(!s.retry_pending);
    }

    #[test]
    fn test_attempt_in_flight_cannot_start_again() {
        let mut s = suggestion();
        assert!(s.is_runnable());
        s.begin_attempt().unwrap();
        assert!(!s.is_runnable());
        assert!(s.begin_attempt().is_err());
        assert_eq!(s.status, SuggestionStatus::Processing);
    }

    #[test]
    fn test_exhausts_after_three_retries() {
        let mut s = suggestion();
        for _ in 0..DEFAULT_SUGGESTION_MAX_RETRIES {
            s.begin_attempt().unwrap();
            assert!(matches!(
                s.fail_attempt("boom").unwrap(),
                AttemptOutcome::Retry { .. }
            ));
        }
        s.begin_attempt().unwrap();
        assert_eq!(s.fail_attempt("last").unwrap(), AttemptOutcome::Exhausted);
        assert_eq!(s.status, SuggestionStatus::Failed);
        assert_eq!(s.retry_count, 3);
        assert_eq!(s.error_message, "last");
        assert!(s.begin_attempt().is_err());
    }

    #[test]
    fn test_cannot_complete_before_start() {
        let mut s = suggestion();
        assert!(s.complete("x", "", SchemaDefinition::default()).is_err());
    }
}
