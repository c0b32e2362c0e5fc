//! Completion client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use super::CompletionError;

/// DeepSeek API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Upper bound on generated tokens per reply.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Instruction prepended to every request; never persisted.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Eres un asistente útil con memoria infinita. Responde en español.";

/// Per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Total attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles on each subsequent retry.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Settings for [`super::CompletionClient`].
///
/// `Debug` is implemented by hand so the API key never reaches the logs.
#[derive(Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl CompletionConfig {
    /// DeepSeek defaults with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }

    /// Replaces the base URL. Only `http` and `https` are accepted.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, CompletionError> {
        parse_base_url(base_url)?;
        self.base_url = base_url.to_string();
        Ok(self)
    }

    /// `{base_url}/chat/completions`, keeping any path prefix on the base URL.
    pub fn endpoint(&self) -> Result<Url, CompletionError> {
        let mut base = parse_base_url(&self.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("chat/completions")
            .map_err(|e| CompletionError::Config(format!("invalid completion endpoint: {e}")))
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, CompletionError> {
    let url = Url::parse(base_url)
        .map_err(|e| CompletionError::Config(format!("invalid base URL '{base_url}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CompletionError::Config(format!(
            "base URL must use http or https: {base_url}"
        )));
    }
    Ok(url)
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}
