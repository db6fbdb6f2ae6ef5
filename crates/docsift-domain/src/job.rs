//! Job module - one durable attempt to extract a document against a schema
//!
//! ```text
//! pending → processing → completed
//!               │  ↑
//!               ↓  │
//!            retrying        (while retry_count < max_retries)
//!               │
//! processing → failed        (retries exhausted, or a non-retryable error)
//! ```
//!
//! Any state can be reset to `pending` by an operator, which zeroes the
//! retry count.

use crate::error::TransitionError;
use crate::ids::{DocumentId, JobId, SchemaId};
use crate::time::unix_now;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of automatic retries before a job fails permanently
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created or reset, waiting for an attempt
    Pending,

    /// An attempt is running
    Processing,

    /// The last attempt failed; another is scheduled
    Retrying,

    /// Terminal: a result is stored
    Completed,

    /// Terminal: retries exhausted or the job cannot succeed
    Failed,
}

impl JobStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Retrying => "retrying",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "retrying" => Some(JobStatus::Retrying),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Whether no further automatic transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid job status: {}", s))
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a failed attempt leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Another attempt should be scheduled; `retry_count` is the updated count
    Retry {
        /// Retries consumed so far, including this one
        retry_count: u32,
    },

    /// No retries left; the job is now failed
    Exhausted,
}

/// A processing job and its observable progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier
    pub id: JobId,

    /// Document being extracted
    pub document_id: DocumentId,

    /// Schema being extracted against
    pub schema_id: SchemaId,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Automatic retries consumed (never exceeds `max_retries`)
    pub retry_count: u32,

    /// Automatic retries allowed
    pub max_retries: u32,

    /// Whether the current attempt runs chunk by chunk
    pub is_chunked: bool,

    /// Chunk count of the current attempt
    pub total_chunks: usize,

    /// Chunks finished in the current attempt
    pub processed_chunks: usize,

    /// Accumulated result snapshot after the last finished chunk
    pub chunk_results: Option<Value>,

    /// Final result (completed jobs only)
    pub result: Option<Value>,

    /// Message of the most recent failure, empty when none
    pub error_message: String,

    /// Creation time (Unix seconds)
    pub created_at: u64,

    /// Last modification time (Unix seconds)
    pub updated_at: u64,

    /// Completion time (Unix seconds)
    pub completed_at: Option<u64>,
}

impl Job {
    /// Create a pending job
    pub fn new(document_id: DocumentId, schema_id: SchemaId) -> Self {
        let now = unix_now();
        Self {
            id: JobId::new(),
            document_id,
            schema_id,
            status: JobStatus::Pending,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            is_chunked: false,
            total_chunks: 0,
            processed_chunks: 0,
            chunk_results: None,
            result: None,
            error_message: String::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Start an attempt: `pending | retrying → processing`
    ///
    /// Progress from any earlier attempt is cleared; every attempt starts at
    /// chunk 0.
    pub fn begin_attempt(&mut self) -> Result<(), TransitionError> {
        match self.status {
            JobStatus::Pending | JobStatus::Retrying => {
                self.status = JobStatus::Processing;
                self.is_chunked = false;
                self.total_chunks = 0;
                self.processed_chunks = 0;
                self.chunk_results = None;
                self.touch();
                Ok(())
            }
            other => Err(invalid("begin an attempt", other)),
        }
    }

    /// Record that the current attempt was split into `total` chunks
    pub fn mark_chunked(&mut self, total: usize) -> Result<(), TransitionError> {
        self.expect_processing("plan chunks")?;
        self.is_chunked = true;
        self.total_chunks = total;
        self.processed_chunks = 0;
        self.touch();
        Ok(())
    }

    /// Record that chunk `index` (0-based) finished with `accumulated` as the
    /// running result
    pub fn record_progress(
        &mut self,
        index: usize,
        total: usize,
        accumulated: Value,
    ) -> Result<(), TransitionError> {
        self.expect_processing("record progress")?;
        if index < self.processed_chunks {
            return Err(TransitionError::ProgressRegression {
                index,
                processed: self.processed_chunks,
            });
        }
        self.total_chunks = total;
        self.processed_chunks = index + 1;
        self.chunk_results = Some(accumulated);
        self.touch();
        Ok(())
    }

    /// Finish successfully: `processing → completed`
    pub fn complete(&mut self, result: Value) -> Result<(), TransitionError> {
        self.expect_processing("complete")?;
        let now = unix_now();
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.error_message.clear();
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Record a failed attempt: `processing → retrying` while retries remain,
    /// otherwise `processing → failed`
    ///
    /// The message is kept verbatim either way.
    pub fn fail_attempt(
        &mut self,
        message: impl Into<String>,
    ) -> Result<AttemptOutcome, TransitionError> {
        self.expect_processing("record a failure")?;
        self.error_message = message.into();
        self.touch();
        if self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.status = JobStatus::Retrying;
            Ok(AttemptOutcome::Retry {
                retry_count: self.retry_count,
            })
        } else {
            self.status = JobStatus::Failed;
            Ok(AttemptOutcome::Exhausted)
        }
    }

    /// Fail without consuming retries: `processing → failed`
    pub fn fail_permanently(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_processing("fail")?;
        self.error_message = message.into();
        self.status = JobStatus::Failed;
        self.touch();
        Ok(())
    }

    /// Operator restart: any state → `pending`, retry count zeroed
    pub fn reset(&mut self) {
        self.status = JobStatus::Pending;
        self.retry_count = 0;
        self.is_chunked = false;
        self.total_chunks = 0;
        self.processed_chunks = 0;
        self.chunk_results = None;
        self.result = None;
        self.error_message.clear();
        self.completed_at = None;
        self.touch();
    }

    /// Whether the job reached `completed` or `failed`
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn expect_processing(&self, action: &'static str) -> Result<(), TransitionError> {
        if self.status == JobStatus::Processing {
            Ok(())
        } else {
            Err(invalid(action, self.status))
        }
    }

    fn touch(&mut self) {
        self.updated_at = unix_now();
    }
}

fn invalid(action: &'static str, from: JobStatus) -> TransitionError {
    TransitionError::Invalid {
        action,
        from: from.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_job() -> Job {
        Job::new(DocumentId::new(), SchemaId::new())
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = new_job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.retry_count, 0);
        assert_eq!(job.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_happy_path() {
        let mut job = new_job();
        job.begin_attempt().unwrap();
        assert_eq!(job.status, JobStatus::Processing);

        job.complete(json!({"title": "x"})).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(job.result, Some(json!({"title": "x"})));
    }

    #[test]
    fn test_begin_attempt_clears_previous_progress() {
        let mut job = new_job();
        job.begin_attempt().unwrap();
        job.mark_chunked(3).unwrap();
        job.record_progress(0, 3, json!({"a": 1})).unwrap();
        job.fail_attempt("rate limited").unwrap();

        job.begin_attempt().unwrap();
        assert_eq!(job.processed_chunks, 0);
        assert_eq!(job.total_chunks, 0);
        assert!(job.chunk_results.is_none());
        assert!(!job.is_chunked);
    }

    #[test]
    fn test_retry_loop_until_exhausted() {
        let mut job = new_job().with_max_retries(10);
        for attempt in 1..=10u32 {
            job.begin_attempt().unwrap();
            let outcome = job.fail_attempt(format!("failure {}", attempt)).unwrap();
            assert_eq!(outcome, AttemptOutcome::Retry { retry_count: attempt });
            assert_eq!(job.status, JobStatus::Retrying);
        }

        job.begin_attempt().unwrap();
        let outcome = job.fail_attempt("final failure").unwrap();
        assert_eq!(outcome, AttemptOutcome::Exhausted);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retry_count, 10);
        assert_eq!(job.error_message, "final failure");
    }

    #[test]
    fn test_retry_count_never_exceeds_max() {
        let mut job = new_job().with_max_retries(2);
        loop {
            job.begin_attempt().unwrap();
            if job.fail_attempt("boom").unwrap() == AttemptOutcome::Exhausted {
                break;
            }
            assert!(job.retry_count <= job.max_retries);
        }
        assert_eq!(job.retry_count, 2);
    }

    #[test]
    fn test_terminal_states_are_exclusive() {
        let mut job = new_job();
        job.begin_attempt().unwrap();
        job.complete(json!({})).unwrap();

        assert!(job.fail_attempt("late failure").is_err());
        assert!(job.fail_permanently("late failure").is_err());
        assert!(job.begin_attempt().is_err());
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn test_failed_job_cannot_complete() {
        let mut job = new_job();
        job.begin_attempt().unwrap();
        job.fail_permanently("bad schema").unwrap();
        assert!(job.complete(json!({})).is_err());
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn test_cannot_complete_pending_job() {
        let mut job = new_job();
        let err = job.complete(json!({})).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Invalid {
                action: "complete",
                from: "pending"
            }
        );
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut job = new_job();
        job.begin_attempt().unwrap();
        job.mark_chunked(3).unwrap();
        job.record_progress(0, 3, json!({})).unwrap();
        job.record_progress(1, 3, json!({})).unwrap();
        assert_eq!(job.processed_chunks, 2);

        let err = job.record_progress(1, 3, json!({})).unwrap_err();
        assert!(matches!(err, TransitionError::ProgressRegression { .. }));
    }

    #[test]
    fn test_reset_restarts_from_any_state() {
        let mut job = new_job().with_max_retries(0);
        job.begin_attempt().unwrap();
        assert_eq!(job.fail_attempt("boom").unwrap(), AttemptOutcome::Exhausted);

        job.reset();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.retry_count, 0);
        assert!(job.error_message.is_empty());
        assert!(job.begin_attempt().is_ok());
    }

    #[test]
    fn test_complete_clears_error_message() {
        let mut job = new_job();
        job.begin_attempt().unwrap();
        job.fail_attempt("timeout").unwrap();
        job.begin_attempt().unwrap();
        job.complete(json!({"ok": true})).unwrap();
        assert!(job.error_message.is_empty());
        assert_eq!(job.retry_count, 1);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(JobStatus::parse("RETRYING"), Some(JobStatus::Retrying));
        assert_eq!("failed".parse::<JobStatus>(), Ok(JobStatus::Failed));
        assert!(JobStatus::parse("cancelled").is_none());
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Retrying.is_terminal());
    }
}
