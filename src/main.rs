//! chat-relay server entry point.
//!
//! Starts the Axum HTTP server serving the chat page, the submission
//! endpoint and the event stream.

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use chat_relay::api;
use chat_relay::app_state::AppState;
use chat_relay::config::RelayConfig;
use chat_relay::domain::Broadcaster;
use chat_relay::service::RelayService;
use chat_relay::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting chat-relay");

    // Build domain and service layers
    let broadcaster = Broadcaster::new();
    let relay_service = Arc::new(RelayService::new(broadcaster, config.max_message_bytes));

    let app_state = AppState {
        relay_service,
        sse_keep_alive: config.sse_keep_alive,
    };
    let app = api::build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(
        addr = %config.listen_addr,
        static_dir = %config.static_dir.display(),
        "server listening"
    );

    let shutdown = shutdown_signal().context("failed to install signal handlers")?;

    // Event streams never finish on their own, so shutdown does not wait
    // for them: open connections are dropped, which unsubscribes them.
    tokio::select! {
        result = axum::serve(listener, app).into_future() => result.context("server error")?,
        signal = shutdown => tracing::info!(signal, "shutting down"),
    }

    Ok(())
}
