//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use crate::api::dto::HealthResponse;
use crate::error::{ErrorBody, ErrorResponse};

/// Path of the generated OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of every route the relay serves.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "chat-relay",
        description = "Broadcast relay: messages submitted to /chat are pushed to every /sse listener."
    ),
    paths(
        crate::api::handlers::chat::chat_handler,
        crate::api::handlers::system::health_handler,
        crate::sse::handler::sse_handler,
    ),
    components(schemas(HealthResponse, ErrorResponse, ErrorBody)),
    tags(
        (name = "Chat", description = "Message submission and streaming"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/chat", "/sse", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
