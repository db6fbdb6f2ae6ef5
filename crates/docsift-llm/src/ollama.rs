//! Ollama Provider Implementation
//!
//! Structured output through Ollama's chat API. The output shape is sent as
//! the `format` field, which constrains generation to that JSON schema.
//!
//! # Examples
//!
//! ```no_run
//! use docsift_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", 300).unwrap();
//! ```

use crate::parse::extract_json;
use crate::{status_error, LlmError};
use async_trait::async_trait;
use docsift_domain::{LlmCaller, LlmRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default HTTP timeout for one request (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Ollama API provider for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a Value,
    stream: bool,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `timeout_secs`: HTTP timeout for a single request
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Create a provider for `http://localhost:11434`
    pub fn default_endpoint() -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS)
    }

    /// Send a bearer token (for Ollama behind an authenticating proxy)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmCaller for OllamaProvider {
    type Error = LlmError;

    async fn call(&self, request: &LlmRequest) -> Result<Value, Self::Error> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = OllamaChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            format: request.output_shape.as_value(),
            stream: false,
        };

        debug!(
            model = %request.model,
            output = %request.output_name,
            prompt_chars = request.user_message.chars().count(),
            "Sending Ollama chat request"
        );

        let mut builder = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &request.model, text));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_json(&parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::OutputShape;
    use serde_json::json;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", 30).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:11434");
        assert!(provider.api_key.is_none());
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_request_body_shape() {
        let shape = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        let body = OllamaChatRequest {
            model: "llama3.1",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            format: &shape,
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], shape);
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Nothing listens on port 9
        let provider = OllamaProvider::new("http://127.0.0.1:9", 5).unwrap();
        let request = LlmRequest {
            model: "llama3.1".into(),
            system_prompt: "s".into(),
            user_message: "u".into(),
            output_shape: OutputShape::new(json!({"type": "object"})),
            output_name: "t".into(),
            output_description: String::new(),
        };

        let result = provider.call(&request).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore]
    async fn test_ollama_structured_integration() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        let request = LlmRequest {
            model: "llama3.1".into(),
            system_prompt: "Extract the city name.".into(),
            user_message: "I live in Lisbon.".into(),
            output_shape: OutputShape::new(json!({
                "type": "object",
                "properties": {"city": {"type": "string"}}
            })),
            output_name: "city".into(),
            output_description: String::new(),
        };
        let value = provider.call(&request).await.unwrap();
        assert!(value.get("city").is_some());
    }
}
