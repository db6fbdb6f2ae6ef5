//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    Document, DocumentId, ExtractionSchema, Job, JobId, OutputShape, SchemaId, SchemaSuggestion,
    SuggestionId,
};
use async_trait::async_trait;
use serde_json::Value;

/// One structured-output request to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    /// Model identifier understood by the provider
    pub model: String,

    /// Instructions for the model
    pub system_prompt: String,

    /// Document text (and, for later chunks, the accumulated result)
    pub user_message: String,

    /// Shape the returned value must conform to
    pub output_shape: OutputShape,

    /// Identifier-safe name for the output shape
    pub output_name: String,

    /// Human-readable purpose of the output shape
    pub output_description: String,
}

/// Capability that turns a prompt plus output shape into a structured value
///
/// Implemented by the infrastructure layer (docsift-llm). Any failure is
/// treated the same way for retry purposes; the error only needs to render a
/// message.
#[async_trait]
pub trait LlmCaller: Send + Sync {
    /// Error type for LLM calls
    type Error: std::fmt::Display + Send;

    /// Issue one call and return the structured output
    async fn call(&self, request: &LlmRequest) -> Result<Value, Self::Error>;
}

/// Trait for storing and retrieving extraction inputs and job state
///
/// Implemented by the infrastructure layer (docsift-jobs provides an
/// in-memory store)
pub trait JobStore {
    /// Error type for store operations
    type Error;

    /// Get a document by ID
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error>;

    /// Get a schema by ID
    fn get_schema(&self, id: SchemaId) -> Result<Option<ExtractionSchema>, Self::Error>;

    /// Get a job by ID
    fn get_job(&self, id: JobId) -> Result<Option<Job>, Self::Error>;

    /// Insert or replace a job
    fn save_job(&mut self, job: &Job) -> Result<(), Self::Error>;

    /// Get a schema suggestion by ID
    fn get_suggestion(&self, id: SuggestionId) -> Result<Option<SchemaSuggestion>, Self::Error>;

    /// Insert or replace a schema suggestion
    fn save_suggestion(&mut self, suggestion: &SchemaSuggestion) -> Result<(), Self::Error>;
}
