use bytes::Bytes;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{AppError, AppResult};

/// One message in a chat-completion conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Thin client for an OpenAI-compatible chat-completions endpoint.
///
/// Constructed once at startup and shared via app data; no retries are
/// performed (a failed completion surfaces as an upstream error — the quota
/// was already consumed by then, which is the accepted at-least-counted
/// behavior).
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Requests a full (non-streaming) completion and returns the answer text
    pub async fn complete(&self, messages: &[ChatMessage]) -> AppResult<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages,
            stream: false,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed completion response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("Completion response had no choices".to_string()))
    }

    /// Requests a streaming completion and returns the provider's SSE byte
    /// stream for passthrough to the client.
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
    ) -> AppResult<impl Stream<Item = Result<Bytes, reqwest::Error>>> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages,
            stream: true,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        Ok(response.bytes_stream())
    }
}
