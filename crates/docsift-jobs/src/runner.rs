//! Job runner: one call to [`JobRunner::run_attempt`] moves a job through
//! one step of its state machine

use crate::config::JobsConfig;
use crate::error::JobError;
use crate::metrics::JobMetrics;
use docsift_domain::{AttemptOutcome, DocumentId, Job, JobId, JobStatus, JobStore, LlmCaller, SchemaId};
use docsift_extractor::{
    ExtractionObserver, ExtractionOutcome, ExtractionRequest, Extractor, ExtractorError,
};
use serde_json::Value;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{error, info, warn};

/// A store shared between the runner and its in-flight attempts
///
/// Guards are only ever held inside synchronous sections.
pub type SharedStore<S> = Arc<Mutex<S>>;

/// What one attempt did to its record
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptReport {
    /// The record is now `completed`
    Completed,

    /// The attempt failed; the next one should start after `delay`
    RetryScheduled {
        /// Retries consumed so far
        retry_count: u32,
        /// Backoff before the next attempt
        delay: Duration,
    },

    /// The record is now `failed`
    Failed {
        /// Error message stored on the record
        message: String,
    },

    /// The record was not in a runnable state; nothing changed
    Skipped {
        /// The state it was found in
        status: &'static str,
    },
}

impl AttemptReport {
    /// Whether no further attempt follows
    pub fn is_final(&self) -> bool {
        !matches!(self, AttemptReport::RetryScheduled { .. })
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) fn store_error<E: Display>(e: E) -> JobError {
    JobError::Store(e.to_string())
}

enum Prepared {
    Skip(JobStatus),
    Fail(String),
    Run(Job, ExtractionRequest),
}

/// Runs extraction attempts for jobs held in a [`JobStore`]
pub struct JobRunner<L, S>
where
    L: LlmCaller,
{
    pub(crate) extractor: Arc<Extractor<L>>,
    pub(crate) store: SharedStore<S>,
    pub(crate) config: JobsConfig,
    pub(crate) metrics: Arc<Mutex<JobMetrics>>,
}

impl<L, S> JobRunner<L, S>
where
    L: LlmCaller,
    S: JobStore + Send,
    S::Error: Display,
{
    /// Create a runner
    pub fn new(
        extractor: Extractor<L>,
        store: SharedStore<S>,
        config: JobsConfig,
    ) -> Result<Self, JobError> {
        config.validate()?;
        Ok(Self {
            extractor: Arc::new(extractor),
            store,
            config,
            metrics: Arc::new(Mutex::new(JobMetrics::new())),
        })
    }

    /// The extractor attempts run through
    pub fn extractor(&self) -> &Extractor<L> {
        &self.extractor
    }

    /// The backing store
    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    /// The active configuration
    pub fn config(&self) -> &JobsConfig {
        &self.config
    }

    /// Snapshot of the counters
    pub fn metrics(&self) -> JobMetrics {
        lock(&self.metrics).clone()
    }

    /// Create and persist a pending job with the configured retry budget
    pub fn create_job(&self, document_id: DocumentId, schema_id: SchemaId) -> Result<Job, JobError> {
        let job = Job::new(document_id, schema_id).with_max_retries(self.config.max_retries);
        self.save_job(&job)?;
        info!(job_id = %job.id, document_id = %document_id, schema_id = %schema_id, "Created job");
        Ok(job)
    }

    /// Operator restart: back to `pending` with the retry count zeroed
    pub fn reset_job(&self, job_id: JobId) -> Result<Job, JobError> {
        let mut store = lock(&self.store);
        let mut job = store
            .get_job(job_id)
            .map_err(store_error)?
            .ok_or_else(|| JobError::NotFound(format!("job {}", job_id)))?;
        job.reset();
        store.save_job(&job).map_err(store_error)?;
        info!(job_id = %job_id, "Job reset to pending");
        Ok(job)
    }

    /// Run one extraction attempt
    ///
    /// Only `pending` and `retrying` jobs are attempted. Chunk progress is
    /// saved after every chunk, before the next LLM call. A retryable failure
    /// leaves the job `retrying` and reports the backoff; the caller decides
    /// when to run the next attempt.
    pub async fn run_attempt(&self, job_id: JobId) -> Result<AttemptReport, JobError> {
        let (job, request) = match self.prepare(job_id)? {
            Prepared::Skip(status) => {
                info!(job_id = %job_id, status = %status, "Job not runnable, skipping");
                return Ok(AttemptReport::Skipped {
                    status: status.as_str(),
                });
            }
            Prepared::Fail(message) => return Ok(AttemptReport::Failed { message }),
            Prepared::Run(job, request) => (job, request),
        };

        info!(
            job_id = %job.id,
            attempt = job.retry_count + 1,
            schema = %request.schema_name,
            "Starting extraction attempt"
        );

        let mut recorder = ProgressRecorder {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
            job,
        };
        let outcome = self
            .extractor
            .extract_with_observer(&request, &mut recorder)
            .await;

        let mut job = recorder.job;
        let report = self.settle(&mut job, outcome)?;
        self.save_job(&job)?;
        Ok(report)
    }

    fn prepare(&self, job_id: JobId) -> Result<Prepared, JobError> {
        let mut store = lock(&self.store);
        let mut job = store
            .get_job(job_id)
            .map_err(store_error)?
            .ok_or_else(|| JobError::NotFound(format!("job {}", job_id)))?;

        if !matches!(job.status, JobStatus::Pending | JobStatus::Retrying) {
            return Ok(Prepared::Skip(job.status));
        }

        job.begin_attempt()?;
        lock(&self.metrics).record_attempt();

        let document = store.get_document(job.document_id).map_err(store_error)?;
        let schema = store.get_schema(job.schema_id).map_err(store_error)?;
        match (document, schema) {
            (Some(document), Some(schema)) => {
                store.save_job(&job).map_err(store_error)?;
                Ok(Prepared::Run(job, ExtractionRequest::new(&document, &schema)))
            }
            (document, _) => {
                let message = match document {
                    None => format!("document {} not found", job.document_id),
                    Some(_) => format!("schema {} not found", job.schema_id),
                };
                job.fail_permanently(message.clone())?;
                store.save_job(&job).map_err(store_error)?;
                lock(&self.metrics).record_failure();
                error!(job_id = %job.id, error = %message, "Job failed permanently");
                Ok(Prepared::Fail(message))
            }
        }
    }

    fn settle(
        &self,
        job: &mut Job,
        outcome: Result<ExtractionOutcome, ExtractorError>,
    ) -> Result<AttemptReport, JobError> {
        let mut metrics = lock(&self.metrics);
        match outcome {
            Ok(outcome) => {
                job.is_chunked = outcome.is_chunked;
                if outcome.is_chunked {
                    job.total_chunks = outcome.total_chunks;
                }
                job.complete(outcome.result)?;
                metrics.record_completion(outcome.processing_time_ms);
                info!(
                    job_id = %job.id,
                    chunks = outcome.total_chunks,
                    elapsed_ms = outcome.processing_time_ms,
                    "Job completed"
                );
                Ok(AttemptReport::Completed)
            }
            Err(err) if !err.is_retryable() => {
                let message = err.to_string();
                job.fail_permanently(message.clone())?;
                metrics.record_failure();
                error!(job_id = %job.id, error = %message, "Job failed permanently");
                Ok(AttemptReport::Failed { message })
            }
            Err(err) => {
                let message = err.to_string();
                match job.fail_attempt(message.clone())? {
                    AttemptOutcome::Retry { retry_count } => {
                        let delay = self.config.backoff_delay(retry_count - 1);
                        metrics.record_retry();
                        warn!(
                            job_id = %job.id,
                            retry = retry_count,
                            max_retries = job.max_retries,
                            delay_secs = delay.as_secs(),
                            error = %message,
                            "Extraction attempt failed, retry scheduled"
                        );
                        Ok(AttemptReport::RetryScheduled { retry_count, delay })
                    }
                    AttemptOutcome::Exhausted => {
                        metrics.record_failure();
                        error!(
                            job_id = %job.id,
                            retries = job.retry_count,
                            error = %message,
                            "Retries exhausted, job failed"
                        );
                        Ok(AttemptReport::Failed { message })
                    }
                }
            }
        }
    }

    pub(crate) fn save_job(&self, job: &Job) -> Result<(), JobError> {
        lock(&self.store).save_job(job).map_err(store_error)
    }
}

/// Persists chunk progress on the job while an attempt runs
struct ProgressRecorder<S> {
    store: SharedStore<S>,
    metrics: Arc<Mutex<JobMetrics>>,
    job: Job,
}

impl<S> ProgressRecorder<S>
where
    S: JobStore,
    S::Error: Display,
{
    fn persist(&self) {
        if let Err(e) = lock(&self.store).save_job(&self.job) {
            warn!(job_id = %self.job.id, error = %e, "Failed to persist chunk progress");
        }
    }
}

impl<S> ExtractionObserver for ProgressRecorder<S>
where
    S: JobStore + Send,
    S::Error: Display,
{
    fn on_chunks_planned(&mut self, total: usize) {
        match self.job.mark_chunked(total) {
            Ok(()) => self.persist(),
            Err(e) => warn!(job_id = %self.job.id, error = %e, "Could not record chunk plan"),
        }
    }

    fn on_chunk_complete(&mut self, index: usize, total: usize, accumulated: &Value) {
        match self.job.record_progress(index, total, accumulated.clone()) {
            Ok(()) => {
                lock(&self.metrics).record_chunk();
                info!(job_id = %self.job.id, chunk = index + 1, total, "Chunk progress saved");
                self.persist();
            }
            Err(e) => warn!(job_id = %self.job.id, error = %e, "Could not record chunk progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use docsift_domain::{Document, ExtractionSchema, FieldNode, FieldType, SchemaDefinition};
    use docsift_extractor::ExtractorConfig;
    use docsift_llm::MockProvider;
    use serde_json::json;

    fn setup(llm: MockProvider) -> (JobRunner<MockProvider, MemoryStore>, Job) {
        let mut store = MemoryStore::new();
        let doc = store.insert_document(Document::new("memo", "Subject: lunch on Friday"));
        let schema = store.insert_schema(ExtractionSchema::new(
            "Memo",
            SchemaDefinition::new(vec![FieldNode::scalar("subject", FieldType::String)]),
            "mock-model",
        ));
        let extractor = Extractor::new(llm, ExtractorConfig::default()).unwrap();
        let runner =
            JobRunner::new(extractor, Arc::new(Mutex::new(store)), JobsConfig::default()).unwrap();
        let job = runner.create_job(doc, schema).unwrap();
        (runner, job)
    }

    fn stored(runner: &JobRunner<MockProvider, MemoryStore>, id: JobId) -> Job {
        lock(runner.store()).get_job(id).unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_successful_attempt_completes_job() {
        let (runner, job) = setup(MockProvider::new(json!({"subject": "lunch"})));

        let report = runner.run_attempt(job.id).await.unwrap();

        assert_eq!(report, AttemptReport::Completed);
        let job = stored(&runner, job.id);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result, Some(json!({"subject": "lunch"})));
        assert!(!job.is_chunked);
        assert!(job.completed_at.is_some());
        assert_eq!(runner.metrics().completed, 1);
    }

    #[tokio::test]
    async fn test_failed_attempt_schedules_retry() {
        let llm = MockProvider::default();
        llm.push_error("connection refused");
        let (runner, job) = setup(llm);

        let report = runner.run_attempt(job.id).await.unwrap();

        assert_eq!(
            report,
            AttemptReport::RetryScheduled {
                retry_count: 1,
                delay: Duration::from_secs(30)
            }
        );
        let job = stored(&runner, job.id);
        assert_eq!(job.status, JobStatus::Retrying);
        assert_eq!(job.error_message, "LLM error: connection refused");
    }

    #[tokio::test]
    async fn test_terminal_job_is_skipped() {
        let llm = MockProvider::new(json!({"subject": "lunch"}));
        let (runner, job) = setup(llm.clone());
        runner.run_attempt(job.id).await.unwrap();

        let report = runner.run_attempt(job.id).await.unwrap();

        assert_eq!(report, AttemptReport::Skipped { status: "completed" });
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_schema_fails_without_retry() {
        let (runner, _) = setup(MockProvider::default());
        let doc = lock(runner.store()).insert_document(Document::new("orphan", "text"));
        let job = runner.create_job(doc, SchemaId::new()).unwrap();

        let report = runner.run_attempt(job.id).await.unwrap();

        assert!(matches!(report, AttemptReport::Failed { ref message } if message.starts_with("schema")));
        let job = stored(&runner, job.id);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.retry_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let (runner, _) = setup(MockProvider::default());
        let err = runner.run_attempt(JobId::new()).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset_allows_rerun() {
        let llm = MockProvider::new(json!({"subject": "lunch"}));
        let (runner, job) = setup(llm.clone());
        runner.run_attempt(job.id).await.unwrap();

        let reset = runner.reset_job(job.id).unwrap();
        assert_eq!(reset.status, JobStatus::Pending);
        assert_eq!(reset.retry_count, 0);

        assert_eq!(runner.run_attempt(job.id).await.unwrap(), AttemptReport::Completed);
        assert_eq!(llm.call_count(), 2);
    }
}
