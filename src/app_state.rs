//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service for publishing and subscribing.
    pub relay_service: Arc<RelayService>,
    /// Interval between SSE keep-alive comments, if enabled.
    pub sse_keep_alive: Option<Duration>,
}
