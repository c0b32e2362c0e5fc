//! Application error types.
//!
//! Every failure of the chat relay surfaces as `500 {"error": "..."}`. By
//! default the message is a fixed per-kind string and the detail goes to the
//! log only; [`AppError::to_response`] with `expose_detail` passes the raw
//! error text through instead.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_core::completion::CompletionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Completion(CompletionError),

    #[error("Malformed completion response: {0}")]
    MalformedCompletion(String),
}

impl AppError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Database(_) => "database",
            AppError::Completion(_) => "completion",
            AppError::MalformedCompletion(_) => "malformed_completion",
        }
    }

    /// Caller-facing message that carries no internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid request body",
            AppError::Database(_) => "database unavailable",
            AppError::Completion(_) => "completion service unavailable",
            AppError::MalformedCompletion(_) => {
                "completion service returned an unexpected response"
            }
        }
    }

    /// Logs the full error and renders the `500` response.
    pub fn to_response(&self, expose_detail: bool) -> Response {
        error!(kind = self.kind(), error = %self, "chat relay failed");

        let message = if expose_detail {
            self.to_string()
        } else {
            self.public_message().to_string()
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: message }),
        )
            .into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::MalformedResponse(msg) => AppError::MalformedCompletion(msg),
            other => AppError::Completion(other),
        }
    }
}
