use std::collections::VecDeque;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use snapsolve_core::{LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that replays scripted outcomes in order.
///
/// The pipeline makes two ordered calls (recognition, then solving), so each
/// queued entry answers one call. An exhausted script returns a canned
/// response.
pub struct MockProvider {
    name: String,
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a successful response.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.script.get_mut().push_back(Ok(content.into()));
        self
    }

    /// Queue a failed call.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.script.get_mut().push_back(Err(message.into()));
        self
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse> {
        let next = self.script.lock().await.pop_front();
        let content = match next {
            Some(Ok(content)) => content,
            Some(Err(message)) => bail!("{message}"),
            None => "Mock response".to_string(),
        };
        Ok(LlmResponse {
            content,
            provider: self.name.clone(),
            model: "mock".to_string(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}
