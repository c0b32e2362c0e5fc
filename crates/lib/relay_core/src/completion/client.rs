//! HTTP completion client.
//!
//! Each attempt is bounded by the configured timeout. Transient failures
//! (transport errors, `429`, `5xx`) are retried up to `max_attempts` total
//! with exponential backoff; everything else fails immediately.

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::config::CompletionConfig;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::{CompletionError, CompletionProvider};
use crate::messages::{HistoryEntry, Role};

/// Completion API client.
pub struct CompletionClient {
    http: Client,
    endpoint: Url,
    config: CompletionConfig,
}

impl CompletionClient {
    /// Validates `config` and builds the underlying HTTP client.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::Config("completion API key is required".into()));
        }
        if config.max_attempts == 0 {
            return Err(CompletionError::Config("max_attempts must be at least 1".into()));
        }

        let endpoint = config.endpoint()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// System prompt first, then `history` in the given order.
    pub fn build_request(&self, history: &[HistoryEntry]) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage {
            role: Role::System,
            content: self.config.system_prompt.clone(),
        });
        messages.extend(history.iter().map(ChatMessage::from));

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
        }
    }

    async fn send_once(&self, request: &ChatCompletionRequest) -> Result<String, CompletionError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let data: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|e| {
            CompletionError::MalformedResponse(format!("response is not valid JSON: {e}"))
        })?;
        data.into_content()
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, history: &[HistoryEntry]) -> Result<String, CompletionError> {
        let request = self.build_request(history);
        let max_attempts = self.config.max_attempts;
        let mut last_error = None;

        for attempt in 0..max_attempts {
            debug!(
                attempt = attempt + 1,
                max_attempts,
                messages = request.messages.len(),
                model = %request.model,
                "requesting completion"
            );

            match self.send_once(&request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() => {
                    warn!(attempt = attempt + 1, max_attempts, error = %e, "completion attempt failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }

            // Exponential backoff before retry
            if attempt + 1 < max_attempts {
                sleep(self.config.backoff * 2u32.pow(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CompletionError::Config(format!("no completion attempt made ({max_attempts} allowed)"))
        }))
    }
}
