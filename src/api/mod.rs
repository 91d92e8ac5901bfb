//! HTTP layer: route handlers, DTOs, OpenAPI document and router
//! composition.
//!
//! `/chat`, `/sse` and `/health` are served by handlers; `/` serves the
//! chat page and every other path falls through to the static asset
//! directory.

pub mod docs;
pub mod dto;
pub mod handlers;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::RelayConfig;

/// Builds the router with all dynamic endpoints and the OpenAPI routes.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(docs_routes())
}

/// Builds the complete application: dynamic routes, static assets, and the
/// tracing and CORS middleware, bound to `state`.
pub fn build_app(state: AppState, config: &RelayConfig) -> Router {
    Router::new()
        .merge(build_router())
        .route_service("/", ServeFile::new(config.index_path()))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url(docs::OPENAPI_PATH, docs::ApiDoc::openapi()))
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;
    use utoipa::OpenApi;

    Router::new().route(
        docs::OPENAPI_PATH,
        get(|| async { Json(docs::ApiDoc::openapi()) }),
    )
}
