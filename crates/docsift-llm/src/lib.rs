//! Docsift LLM Provider Layer
//!
//! Implementations of the `LlmCaller` trait from `docsift-domain`. Every
//! provider takes a system prompt, a user message and a JSON-schema output
//! shape and returns the model's structured answer as a `serde_json::Value`.
//!
//! # Providers
//!
//! - `MockProvider`: scripted responses for tests, records every request
//! - `OllamaProvider`: local Ollama `/api/chat` with a `format` schema
//! - `OpenAiProvider`: OpenAI-compatible chat completions with
//!   `response_format: json_schema`
//!
//! `Provider` wraps all three behind one config-driven type. Credentials are
//! passed in through `ProviderConfig`; nothing is read from or written to the
//! process environment.
//!
//! Providers never retry on their own. Retrying is the job layer's decision.
//!
//! # Examples
//!
//! ```
//! use docsift_domain::{LlmCaller, LlmRequest, OutputShape};
//! use docsift_llm::MockProvider;
//! use serde_json::json;
//!
//! # tokio_test_block_on(async {
//! let provider = MockProvider::new(json!({"title": "Quarterly report"}));
//! let request = LlmRequest {
//!     model: "test".into(),
//!     system_prompt: "Extract".into(),
//!     user_message: "Some text".into(),
//!     output_shape: OutputShape::new(json!({"type": "object"})),
//!     output_name: "report".into(),
//!     output_description: String::new(),
//! };
//! let value = provider.call(&request).await.unwrap();
//! assert_eq!(value["title"], "Quarterly report");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod parse;
pub mod provider;

use thiserror::Error;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{Provider, ProviderConfig, ProviderKind};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is missing required settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Map a non-success HTTP status to an error
pub(crate) fn status_error(status: reqwest::StatusCode, model: &str, body: String) -> LlmError {
    match status {
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::Configuration(format!("HTTP {}: {}", status, body))
        }
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "m", String::new()),
            LlmError::RateLimitExceeded
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, "llama3.1", String::new()),
            LlmError::ModelNotAvailable("llama3.1".into())
        );
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "m", "bad key".into()),
            LlmError::Configuration(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "m", "upstream".into()),
            LlmError::Communication(msg) if msg.contains("upstream")
        ));
    }
}
