//! Docsift Jobs
//!
//! Durable extraction jobs on top of the extractor: attempts, retries with
//! exponential backoff, chunk progress persistence and background dispatch.
//!
//! # Overview
//!
//! - **Runner**: [`JobRunner::run_attempt`] moves a job through one step of
//!   its state machine and reports what happened
//! - **Worker**: [`JobWorker`] spawns one task per job and sleeps through
//!   backoff between attempts
//! - **Suggestions**: the same loop for schema suggestions, with a smaller
//!   retry budget and a lower backoff cap
//! - **Metrics**: counters shared by every attempt of a runner
//!
//! ## Job Lifecycle
//!
//! | From | Event | To |
//! |------|-------|----|
//! | pending / retrying | attempt starts | processing |
//! | processing | extraction succeeded | completed |
//! | processing | failure, retries left | retrying |
//! | processing | failure, retries exhausted | failed |
//! | processing | malformed schema / missing record | failed |
//! | any | operator reset | pending |
//!
//! Backoff before retry `n` (0-based) is `min(2^n * 30, 600)` seconds.
//!
//! # Usage
//!
//! ```no_run
//! use docsift_domain::{Document, ExtractionSchema, FieldNode, FieldType, SchemaDefinition};
//! use docsift_extractor::{Extractor, ExtractorConfig};
//! use docsift_jobs::{AttemptReport, JobRunner, JobsConfig, MemoryStore};
//! use docsift_llm::MockProvider;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = MemoryStore::new();
//! let doc = store.insert_document(Document::new("memo", "Subject: lunch"));
//! let schema = store.insert_schema(ExtractionSchema::new(
//!     "Memo",
//!     SchemaDefinition::new(vec![FieldNode::scalar("subject", FieldType::String)]),
//!     "llama3.1",
//! ));
//!
//! let extractor = Extractor::new(MockProvider::default(), ExtractorConfig::default())?;
//! let runner = JobRunner::new(extractor, Arc::new(Mutex::new(store)), JobsConfig::default())?;
//! let job = runner.create_job(doc, schema)?;
//!
//! // Drive attempts by hand, or hand the job to a JobWorker
//! loop {
//!     match runner.run_attempt(job.id).await? {
//!         AttemptReport::RetryScheduled { delay, .. } => tokio::time::sleep(delay).await,
//!         report => {
//!             println!("{:?}", report);
//!             break;
//!         }
//!     }
//! }
//! println!("{}", runner.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [jobs]
//! max_retries = 10
//! backoff_base_secs = 30
//! backoff_max_secs = 600
//! suggestion_max_retries = 3
//! suggestion_backoff_max_secs = 300
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod runner;
mod store;
mod suggestion;
mod worker;

pub use config::JobsConfig;
pub use error::JobError;
pub use metrics::JobMetrics;
pub use runner::{AttemptReport, JobRunner, SharedStore};
pub use store::MemoryStore;
pub use worker::{JobHandle, JobWorker};
