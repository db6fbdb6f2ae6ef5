//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider setup or call error
    #[error("LLM provider error: {0}")]
    Llm(#[from] docsift_llm::LlmError),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] docsift_extractor::ExtractorError),

    /// Job runner error
    #[error("Job error: {0}")]
    Job(#[from] docsift_jobs::JobError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The job or suggestion ended in `failed`
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}
