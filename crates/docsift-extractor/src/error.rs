//! Error types for the Extractor

use docsift_domain::SchemaViolation;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// The LLM-calling capability failed (transport, rate limit, bad output)
    ///
    /// Carries the provider's message unchanged.
    #[error("{0}")]
    Llm(String),

    /// A single LLM call exceeded the configured timeout
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    /// The field schema tree breaks the type/fields/items invariant
    #[error("Malformed schema: {0}")]
    MalformedSchema(#[from] SchemaViolation),

    /// The model returned a value of the wrong overall shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether running the same attempt again could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ExtractorError::MalformedSchema(_) | ExtractorError::Config(_)
        )
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
