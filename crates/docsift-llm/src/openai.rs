//! OpenAI-compatible chat completions provider
//!
//! Uses `response_format: {"type": "json_schema"}` so the API enforces the
//! output shape. Works with any server exposing `/chat/completions` under
//! the configured base URL.

use crate::ollama::ChatMessage;
use crate::parse::extract_json;
use crate::{status_error, LlmError};
use async_trait::async_trait;
use docsift_domain::{LlmCaller, LlmRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider with an explicit API key
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "OpenAI provider requires an api_key".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn response_format(request: &LlmRequest) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": request.output_name,
                "description": request.output_description,
                "schema": request.output_shape.as_value(),
                "strict": false,
            }
        })
    }
}

#[async_trait]
impl LlmCaller for OpenAiProvider {
    type Error = LlmError;

    async fn call(&self, request: &LlmRequest) -> Result<Value, Self::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
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
            response_format: Self::response_format(request),
        };

        debug!(
            model = %request.model,
            output = %request.output_name,
            prompt_chars = request.user_message.chars().count(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
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

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(LlmError::InvalidResponse(format!("model refused: {}", refusal)));
        }
        let content = message
            .content
            .ok_or_else(|| LlmError::InvalidResponse("response has no content".to_string()))?;

        extract_json(&content)
    }
}
