//! API configuration.

use relay_core::messages::HISTORY_LIMIT;

/// Configuration for the API layer.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8888").
    pub bind_addr: String,
    /// Number of messages replayed to the completion API per request.
    pub history_limit: i64,
    /// Return raw internal error text to callers instead of an opaque message.
    pub expose_error_details: bool,
}

impl ApiConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            history_limit: HISTORY_LIMIT,
            expose_error_details: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("0.0.0.0:8888")
    }
}
