//! Background worker: one tokio task per job, sleeping through backoff

use crate::error::JobError;
use crate::metrics::JobMetrics;
use crate::runner::{AttemptReport, JobRunner};
use docsift_domain::{JobId, JobStore, LlmCaller, SuggestionId};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Dispatches jobs and suggestions onto the tokio runtime
///
/// Each dispatched record gets its own task that runs attempts until the
/// record reaches a terminal state. Backoff is a `tokio::time::sleep`, so
/// waiting jobs hold no thread and never delay each other.
///
/// # Examples
///
/// ```no_run
/// use docsift_domain::{Document, ExtractionSchema, FieldNode, FieldType, SchemaDefinition};
/// use docsift_extractor::{Extractor, ExtractorConfig};
/// use docsift_jobs::{JobRunner, JobWorker, JobsConfig, MemoryStore};
/// use docsift_llm::MockProvider;
/// use std::sync::{Arc, Mutex};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut store = MemoryStore::new();
///     let doc = store.insert_document(Document::new("memo", "Subject: lunch"));
///     let schema = store.insert_schema(ExtractionSchema::new(
///         "Memo",
///         SchemaDefinition::new(vec![FieldNode::scalar("subject", FieldType::String)]),
///         "llama3.1",
///     ));
///
///     let extractor = Extractor::new(MockProvider::default(), ExtractorConfig::default())?;
///     let runner = JobRunner::new(extractor, Arc::new(Mutex::new(store)), JobsConfig::default())?;
///     let job = runner.create_job(doc, schema)?;
///
///     let worker = JobWorker::new(runner);
///     let report = worker.dispatch(job.id).join().await?;
///     println!("{:?}", report);
///     Ok(())
/// }
/// ```
pub struct JobWorker<L, S>
where
    L: LlmCaller,
{
    runner: Arc<JobRunner<L, S>>,
}

impl<L, S> JobWorker<L, S>
where
    L: LlmCaller + 'static,
    S: JobStore + Send + 'static,
    S::Error: Display,
{
    /// Create a worker around a runner
    pub fn new(runner: JobRunner<L, S>) -> Self {
        Self::from_arc(Arc::new(runner))
    }

    /// Create a worker around a shared runner
    pub fn from_arc(runner: Arc<JobRunner<L, S>>) -> Self {
        Self { runner }
    }

    /// The runner attempts go through
    pub fn runner(&self) -> &Arc<JobRunner<L, S>> {
        &self.runner
    }

    /// Snapshot of the runner's counters
    pub fn metrics(&self) -> JobMetrics {
        self.runner.metrics()
    }

    /// Run `job_id` to a terminal state in the background
    pub fn dispatch(&self, job_id: JobId) -> JobHandle {
        let runner = Arc::clone(&self.runner);
        let task = tokio::spawn(async move { drive(|| runner.run_attempt(job_id)).await });
        tracing::debug!(job_id = %job_id, "Job dispatched");
        JobHandle {
            label: format!("job {}", job_id),
            task,
        }
    }

    /// Dispatch every job independently
    ///
    /// One job's failure has no effect on the others.
    pub fn dispatch_batch<I>(&self, job_ids: I) -> Vec<JobHandle>
    where
        I: IntoIterator<Item = JobId>,
    {
        let handles: Vec<JobHandle> = job_ids.into_iter().map(|id| self.dispatch(id)).collect();
        tracing::info!("Dispatched batch of {} jobs", handles.len());
        handles
    }

    /// Run a schema suggestion to a terminal state in the background
    pub fn dispatch_suggestion(&self, id: SuggestionId) -> JobHandle {
        let runner = Arc::clone(&self.runner);
        let task = tokio::spawn(async move { drive(|| runner.run_suggestion_attempt(id)).await });
        tracing::debug!(suggestion_id = %id, "Schema suggestion dispatched");
        JobHandle {
            label: format!("suggestion {}", id),
            task,
        }
    }
}

async fn drive<F, Fut>(mut attempt: F) -> Result<AttemptReport, JobError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<AttemptReport, JobError>>,
{
    loop {
        match attempt().await? {
            AttemptReport::RetryScheduled { delay, .. } => tokio::time::sleep(delay).await,
            report => return Ok(report),
        }
    }
}

/// Handle to a dispatched job or suggestion
pub struct JobHandle {
    label: String,
    task: JoinHandle<Result<AttemptReport, JobError>>,
}

impl JobHandle {
    /// What this handle runs, e.g. `job <id>`
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stop the task
    ///
    /// A pending backoff is cancelled and the record stays `retrying`.
    /// Cancelling mid-attempt leaves it `processing` until it is reset.
    pub fn cancel(&self) {
        tracing::info!("Cancelling {}", self.label);
        self.task.abort();
    }

    /// Whether the task has stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the final report
    pub async fn join(self) -> Result<AttemptReport, JobError> {
        match self.task.await {
            Ok(report) => report,
            Err(e) if e.is_cancelled() => {
                Err(JobError::Worker(format!("{} was cancelled", self.label)))
            }
            Err(e) => Err(JobError::Worker(format!("{} panicked: {}", self.label, e))),
        }
    }
}
