//! Chat submission handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::api::dto::ChatQuery;
use crate::app_state::AppState;
use crate::domain::Message;
use crate::error::{ErrorResponse, RelayError};

/// `GET /chat?message=<text>` — Broadcast a message to all listeners.
///
/// Publishes exactly once and answers immediately with an empty body,
/// regardless of how many listeners received the message.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] if the query string cannot be
/// decoded, or [`RelayError::MessageTooLarge`] if a size limit is configured
/// and exceeded.
#[utoipa::path(
    get,
    path = "/chat",
    tag = "Chat",
    summary = "Publish a chat message",
    description = "Broadcasts `message` verbatim to every open `/sse` stream. A missing parameter publishes the empty string; a repeated parameter publishes its last value.",
    params(ChatQuery),
    responses(
        (status = 200, description = "Message accepted"),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 413, description = "Message exceeds configured limit", body = ErrorResponse),
    )
)]
pub async fn chat_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<StatusCode, RelayError> {
    let Query(pairs) =
        query.map_err(|rejection| RelayError::InvalidRequest(rejection.body_text()))?;
    let query = ChatQuery::from_pairs(pairs);
    state.relay_service.submit(Message::from(query.message))?;
    Ok(StatusCode::OK)
}

/// Chat routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/chat", get(chat_handler))
}
