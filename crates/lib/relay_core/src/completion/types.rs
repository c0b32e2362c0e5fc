//! Wire types for `POST /chat/completions`.

use serde::{Deserialize, Serialize};

use super::CompletionError;
use crate::messages::{HistoryEntry, Role};

/// Request body sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<&HistoryEntry> for ChatMessage {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            role: entry.role,
            content: entry.content.clone(),
        }
    }
}

/// Response body returned by the completion API.
///
/// Every level is optional so that a structurally unexpected response
/// surfaces as [`CompletionError::MalformedResponse`] rather than a decode error.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Extracts `choices[0].message.content`.
    pub fn into_content(self) -> Result<String, CompletionError> {
        let choice = self
            .choices
            .ok_or_else(|| CompletionError::MalformedResponse("missing `choices`".into()))?
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("empty `choices`".into()))?;

        choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| {
                CompletionError::MalformedResponse("missing `choices[0].message.content`".into())
            })
    }
}
