//! Message persistence.
//!
//! A conversation is the set of `messages` rows sharing a `chat_id`. Rows are
//! only ever inserted. History reads return the newest [`HISTORY_LIMIT`] rows
//! in chronological order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use thiserror::Error;

/// Maximum number of messages replayed to the completion API per request.
pub const HISTORY_LIMIT: i64 = 20;

/// Conversation used when the caller omits `chat_id`.
///
/// Every caller that omits the field shares this conversation.
pub const DEFAULT_CHAT_ID: &str = "1";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored role is not one of the known values.
#[derive(Debug, Error)]
#[error("unknown message role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Row returned by message queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: i64,
    pub chat_id: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Role/content pair replayed to the completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryEntry {
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Append a message to a conversation. `created_at` is assigned by the server.
pub async fn insert_message(
    conn: &mut PgConnection,
    chat_id: &str,
    role: Role,
    content: &str,
) -> Result<MessageRow, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        INSERT INTO messages (chat_id, role, content)
        VALUES ($1, $2, $3)
        RETURNING id, chat_id, role, content, created_at
        "#,
    )
    .bind(chat_id)
    .bind(role.as_str())
    .bind(content)
    .fetch_one(conn)
    .await
}

/// Get the newest `limit` messages of a conversation, oldest first.
///
/// Rows with equal `created_at` are ordered by insertion (`id`).
pub async fn recent_history(
    conn: &mut PgConnection,
    chat_id: &str,
    limit: i64,
) -> Result<Vec<HistoryEntry>, sqlx::Error> {
    sqlx::query_as::<_, HistoryEntry>(
        r#"
        SELECT role, content
        FROM (
            SELECT id, role, content, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
        ) recent
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(chat_id)
    .bind(limit)
    .fetch_all(conn)
    .await
}

/// Get every message of a conversation, oldest first.
pub async fn list_messages(
    conn: &mut PgConnection,
    chat_id: &str,
) -> Result<Vec<MessageRow>, sqlx::Error> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, chat_id, role, content, created_at
        FROM messages
        WHERE chat_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(chat_id)
    .fetch_all(conn)
    .await
}
