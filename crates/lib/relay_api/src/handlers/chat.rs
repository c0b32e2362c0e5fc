//! Chat relay handler.
//!
//! `POST /api/chat` stores the user message, replays the recent history to
//! the completion API, stores the reply and returns it. The steps are not
//! wrapped in a transaction: a user message stored before a later failure
//! stays stored.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use relay_core::messages::{self, DEFAULT_CHAT_ID, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Conversation to append to; absent or `null` means [`DEFAULT_CHAT_ID`].
    #[serde(default)]
    pub chat_id: Option<String>,
}

impl ChatRequest {
    /// Parses a raw request body. `Content-Type` is not checked.
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body).map_err(|e| AppError::InvalidRequest(e.to_string()))
    }

    pub fn chat_id(&self) -> &str {
        self.chat_id.as_deref().unwrap_or(DEFAULT_CHAT_ID)
    }
}

/// Successful reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `POST /api/chat`: relay one message and return the assistant reply.
pub async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match relay(&state, &body).await {
        Ok(response) => Json(ChatResponse { response }).into_response(),
        Err(e) => e.to_response(state.config.expose_error_details),
    }
}

async fn relay(state: &AppState, body: &[u8]) -> AppResult<String> {
    let request = ChatRequest::parse(body)?;
    let chat_id = request.chat_id();

    // Returned to the pool when dropped, whichever way this function exits.
    let mut conn = state.pool.acquire().await?;

    messages::insert_message(&mut conn, chat_id, Role::User, &request.message).await?;

    let history = messages::recent_history(&mut conn, chat_id, state.config.history_limit).await?;
    debug!(chat_id, history_len = history.len(), "loaded conversation history");

    let reply = state.completion.complete(&history).await?;

    messages::insert_message(&mut conn, chat_id, Role::Assistant, &reply).await?;
    info!(chat_id, reply_len = reply.len(), "relayed chat message");

    Ok(reply)
}
