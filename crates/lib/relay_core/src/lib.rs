//! # relay_core
//!
//! Core domain logic for Relay: the message log, PostgreSQL pool
//! construction and the chat-completion client.

pub mod completion;
pub mod db;
pub mod messages;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
