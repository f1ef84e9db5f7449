use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use snapsolve_core::{LlmProvider, LlmRequest, LlmResponse, SnapError};

/// OpenAI-compatible hosted chat-completions provider.
///
/// Used for both delegated calls: recognition (with an `image_url` content
/// part) and solving (plain text).
pub struct AiGatewayProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AiGatewayProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_messages(request: &LlmRequest) -> Vec<Value> {
        let mut messages = Vec::new();
        if !request.system_prompt.is_empty() {
            messages.push(json!({ "role": "system", "content": request.system_prompt }));
        }
        // Multimodal requests carry the user text and the image as content
        // parts; text-only requests stay a plain string.
        let user_content = match &request.image_url {
            Some(url) => json!([
                { "type": "text", "text": request.user_prompt },
                { "type": "image_url", "image_url": { "url": url } }
            ]),
            None => json!(request.user_prompt),
        };
        messages.push(json!({ "role": "user", "content": user_content }));
        messages
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

#[async_trait]
impl LlmProvider for AiGatewayProvider {
    fn name(&self) -> &str {
        "ai-gateway"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();

        let body = json!({
            "model": request.model,
            "messages": Self::build_messages(request),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        debug!(
            model = %request.model,
            has_image = request.image_url.is_some(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("AI gateway HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SnapError::ProviderError {
                provider: self.name().to_string(),
                message: format!("{status}: {error_body}"),
            }
            .into());
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse AI gateway response")?;

        let content = chat
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        let tokens_used = chat.usage.and_then(|u| u.total_tokens).unwrap_or(0);

        Ok(LlmResponse {
            content,
            provider: self.name().to_string(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
