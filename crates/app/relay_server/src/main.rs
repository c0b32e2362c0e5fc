//! Relay chat server binary.
//!
//! Reads configuration from flags, the environment and `.env`, builds the
//! shared connection pool and completion client, and serves the chat API
//! until Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use relay_api::AppState;
use relay_api::config::ApiConfig;
use relay_core::completion::{CompletionClient, CompletionConfig};
use relay_core::db::{self, DbConfig, TlsMode};
use relay_core::messages::HISTORY_LIMIT;
use tracing::{info, warn};

/// CLI arguments for the relay server.
#[derive(Parser, Debug)]
#[command(name = "relay_server", about = "Chat relay between HTTP clients, PostgreSQL and an LLM")]
struct Args {
    /// Address to listen on.
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:8888")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Database transport security: `require` (encrypted, certificate not
    /// verified) or `disable` (use the URL's sslmode as-is).
    #[arg(long = "db-tls", env = "DATABASE_TLS", default_value = "require")]
    db_tls: TlsMode,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = db::DEFAULT_MAX_CONNECTIONS)]
    max_connections: u32,

    /// Create the `messages` table on startup if it does not exist.
    #[arg(long, env = "RELAY_INIT_SCHEMA", default_value_t = false)]
    init_schema: bool,

    /// Completion API key.
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Completion API base URL (`/chat/completions` is appended).
    #[arg(
        long,
        env = "DEEPSEEK_BASE_URL",
        default_value = relay_core::completion::config::DEFAULT_BASE_URL
    )]
    completion_base_url: String,

    /// Completion model identifier.
    #[arg(
        long,
        env = "DEEPSEEK_MODEL",
        default_value = relay_core::completion::config::DEFAULT_MODEL
    )]
    model: String,

    /// Maximum tokens per generated reply.
    #[arg(
        long,
        env = "RELAY_MAX_TOKENS",
        default_value_t = relay_core::completion::config::DEFAULT_MAX_TOKENS
    )]
    max_tokens: u32,

    /// Per-attempt timeout for completion requests, in seconds.
    #[arg(long, env = "RELAY_COMPLETION_TIMEOUT_SECS", default_value_t = 60)]
    completion_timeout_secs: u64,

    /// Total completion attempts, including the first.
    #[arg(
        long,
        env = "RELAY_COMPLETION_ATTEMPTS",
        default_value_t = relay_core::completion::config::DEFAULT_MAX_ATTEMPTS
    )]
    completion_attempts: u32,

    /// Return raw internal error text to callers.
    #[arg(long, env = "RELAY_EXPOSE_ERRORS", default_value_t = false)]
    expose_errors: bool,
}

impl Args {
    fn db_config(&self) -> DbConfig {
        let mut config = DbConfig::new(self.database_url.clone());
        config.max_connections = self.max_connections;
        config.tls = self.db_tls;
        config
    }

    fn completion_config(&self) -> Result<CompletionConfig, relay_core::completion::CompletionError> {
        let mut config =
            CompletionConfig::new(self.api_key.clone()).with_base_url(&self.completion_base_url)?;
        config.model = self.model.clone();
        config.max_tokens = self.max_tokens;
        config.timeout = Duration::from_secs(self.completion_timeout_secs);
        config.max_attempts = self.completion_attempts;
        Ok(config)
    }

    fn api_config(&self) -> ApiConfig {
        ApiConfig {
            bind_addr: self.bind_addr.clone(),
            history_limit: HISTORY_LIMIT,
            expose_error_details: self.expose_errors,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,relay_api=debug,relay_core=debug")
                }),
        )
        .init();

    let args = Args::parse();

    info!(
        version = relay_core::version(),
        bind_addr = %args.bind_addr,
        "starting relay_server"
    );

    let pool = db::connect(&args.db_config()).await?;

    if args.init_schema {
        db::ensure_schema(&pool).await?;
    }

    let completion_config = args.completion_config()?;
    info!(config = ?completion_config, "configuring completion client");
    let completion = CompletionClient::new(completion_config)?;

    let config = args.api_config();
    if config.expose_error_details {
        warn!("internal error details will be returned to callers");
    }

    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        completion: Arc::new(completion),
    };

    let app = relay_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "chat API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("relay_server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
