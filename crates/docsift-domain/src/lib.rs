//! Docsift Domain Layer
//!
//! Core model for schema-driven document extraction. This crate holds the
//! entities, value objects and state machines every other layer builds on,
//! plus the trait boundaries for the two external collaborators: the
//! LLM-calling capability and job persistence.
//!
//! ## Key Concepts
//!
//! - **Field schema tree**: user-authored description of what to extract
//! - **Output shape**: the declarative type description an LLM call is constrained by
//! - **Job**: one durable attempt to extract one document against one schema
//! - **Schema suggestion**: an LLM-proposed schema for a document
//!
//! ## Architecture
//!
//! - Pure business logic only, no I/O
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod ids;
pub mod job;
pub mod schema;
pub mod suggestion;
pub mod traits;

mod time;

// Re-exports for convenience
pub use document::{Document, ExtractionSchema};
pub use error::{SchemaViolation, TransitionError};
pub use ids::{DocumentId, JobId, SchemaId, SuggestionId};
pub use job::{AttemptOutcome, Job, JobStatus, DEFAULT_MAX_RETRIES};
pub use schema::{FieldNode, FieldType, ItemNode, OutputShape, SchemaDefinition};
pub use suggestion::{SchemaSuggestion, SuggestionStatus, DEFAULT_SUGGESTION_MAX_RETRIES};
pub use time::unix_now;
pub use traits::{JobStore, LlmCaller, LlmRequest};
