//! Mock LLM provider for deterministic testing

use crate::LlmError;
use async_trait::async_trait;
use docsift_domain::{LlmCaller, LlmRequest};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Mock provider returning scripted responses without any network calls
///
/// Scripted responses and errors are consumed in FIFO order; once the script
/// is empty every call returns the default response. Clones share the
/// script and the request log.
///
/// # Examples
///
/// ```
/// use docsift_llm::MockProvider;
/// use serde_json::json;
///
/// let provider = MockProvider::new(json!({}));
/// provider.push_response(json!({"items": ["a"]}));
/// provider.push_error("rate limited");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: Value,
    script: Arc<Mutex<VecDeque<Result<Value, LlmError>>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
    latency: Option<Duration>,
}

impl MockProvider {
    /// Create a mock that answers every call with `response`
    pub fn new(response: Value) -> Self {
        Self {
            default_response: response,
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            latency: None,
        }
    }

    /// Delay every call by `latency` (for timeout tests)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a response for the next unscripted call
    pub fn push_response(&self, response: Value) {
        lock(&self.script).push_back(Ok(response));
    }

    /// Queue a failure for the next unscripted call
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script)
            .push_back(Err(LlmError::Other(message.into())));
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<LlmRequest> {
        lock(&self.requests).clone()
    }

    /// Clear the request log
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

#[async_trait]
impl LlmCaller for MockProvider {
    type Error = LlmError;

    async fn call(&self, request: &LlmRequest) -> Result<Value, Self::Error> {
        lock(&self.requests).push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = lock(&self.script).pop_front();
        next.unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
