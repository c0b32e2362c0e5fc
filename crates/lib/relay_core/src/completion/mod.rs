//! Chat-completion client for OpenAI-compatible APIs (DeepSeek by default).
//!
//! # Public API
//!
//! - [`CompletionProvider`]: the seam handlers depend on
//! - [`CompletionClient`]: HTTP implementation with timeout and retry
//! - [`CompletionConfig`]: endpoint, credentials, model and retry policy
//! - [`types`]: request/response wire types

pub mod client;
pub mod config;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

use crate::messages::HistoryEntry;

pub use client::CompletionClient;
pub use config::CompletionConfig;

/// Errors that can occur while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures (including timeouts), `429` and `5xx` are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Transport(_) => true,
            CompletionError::Status { status, .. } => *status == 429 || *status >= 500,
            CompletionError::Config(_) | CompletionError::MalformedResponse(_) => false,
        }
    }
}

/// Generates the next assistant message for a conversation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the assistant reply to `history` (oldest message first).
    async fn complete(&self, history: &[HistoryEntry]) -> Result<String, CompletionError>;
}
