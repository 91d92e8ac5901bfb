//! Axum handler for the `GET /sse` streaming endpoint.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Response, header};
use axum::response::IntoResponse;

use super::connection::SseConnection;
use super::frame::CONTENT_TYPE;
use crate::app_state::AppState;
use crate::error::RelayError;

/// `GET /sse` — Open a Server-Sent Events stream of chat messages.
///
/// Every message published after the connection opens is pushed as one
/// `message` event whose data is the literal text. The stream stays open
/// until the client disconnects.
///
/// # Errors
///
/// Returns [`RelayError::Internal`] if the streaming response cannot be
/// assembled.
#[utoipa::path(
    get,
    path = "/sse",
    tag = "Chat",
    summary = "Stream chat messages",
    description = "Opens a long-lived `text/event-stream` response. Each published message arrives as one event; nothing published before the connection opened is replayed.",
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = String),
    )
)]
pub async fn sse_handler(State(state): State<AppState>) -> Result<impl IntoResponse, RelayError> {
    let connection = SseConnection::open(&state.relay_service, state.sse_keep_alive);
    event_stream_response(connection)
}

/// Wraps `connection` in a `text/event-stream` response.
fn event_stream_response(connection: SseConnection) -> Result<Response<Body>, RelayError> {
    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE))
        .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .body(Body::from_stream(connection))
        .map_err(|e| RelayError::Internal(format!("building event stream response: {e}")))
}
