//! Config-driven provider selection

use crate::{LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use async_trait::async_trait;
use docsift_domain::{LlmCaller, LlmRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    Ollama,
    /// OpenAI or a compatible server
    #[serde(rename = "openai")]
    OpenAi,
    /// Offline mock answering `{}`
    Mock,
}

/// `[llm]` configuration section
///
/// # TOML Example
///
/// ```toml
/// [llm]
/// provider = "openai"
/// endpoint = "https://api.openai.com/v1"
/// model = "gpt-4o-mini"
/// api_key = "sk-..."
/// timeout_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend selection
    pub provider: ProviderKind,

    /// Base URL; the backend's default when absent
    pub endpoint: Option<String>,

    /// Default model identifier
    pub model: String,

    /// Credential handed to the provider
    pub api_key: Option<String>,

    /// HTTP timeout for one request
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            endpoint: None,
            model: "llama3.1".to_string(),
            api_key: None,
            timeout_secs: crate::ollama::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::Configuration("model must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(LlmError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.provider == ProviderKind::OpenAi
            && !self
                .api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty())
        {
            return Err(LlmError::Configuration(
                "provider 'openai' requires api_key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Any of the built-in providers
#[derive(Debug, Clone)]
pub enum Provider {
    /// Ollama backend
    Ollama(OllamaProvider),
    /// OpenAI-compatible backend
    OpenAi(OpenAiProvider),
    /// Mock backend
    Mock(MockProvider),
}

impl Provider {
    /// Build the provider described by `config`
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        config.validate()?;
        match config.provider {
            ProviderKind::Ollama => {
                let endpoint = config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| crate::ollama::DEFAULT_ENDPOINT.to_string());
                let mut provider = OllamaProvider::new(endpoint, config.timeout_secs)?;
                if let Some(key) = &config.api_key {
                    provider = provider.with_api_key(key.clone());
                }
                Ok(Provider::Ollama(provider))
            }
            ProviderKind::OpenAi => {
                let endpoint = config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| crate::openai::DEFAULT_BASE_URL.to_string());
                let key = config.api_key.clone().unwrap_or_default();
                Ok(Provider::OpenAi(OpenAiProvider::new(
                    endpoint,
                    key,
                    config.timeout_secs,
                )?))
            }
            ProviderKind::Mock => Ok(Provider::Mock(MockProvider::default())),
        }
    }
}

#[async_trait]
impl LlmCaller for Provider {
    type Error = LlmError;

    async fn call(&self, request: &LlmRequest) -> Result<Value, Self::Error> {
        match self {
            Provider::Ollama(p) => p.call(request).await,
            Provider::OpenAi(p) => p.call(request).await,
            Provider::Mock(p) => p.call(request).await,
        }
    }
}
