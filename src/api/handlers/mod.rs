//! HTTP endpoint handlers organized by resource.

pub mod chat;
pub mod system;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;
use crate::sse::handler::sse_handler;

/// Composes the chat, streaming and system routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(chat::routes())
        .merge(system::routes())
        .route("/sse", get(sse_handler))
}
