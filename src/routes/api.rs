use crate::{docs::ApiDoc, handlers::{diagnostics, health_check, pad_snapshot, ready_check}, websocket::websocket_handler, ws::padhub::PadHub};
use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::{AllowOrigin, Any, CorsLayer}, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create API routes
pub fn create_api_routes(hub: Arc<PadHub>) -> Router {
    Router::<Arc<PadHub>>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/v1/pads/:room", get(pad_snapshot))
        .route("/v1/diagnostics", get(diagnostics))
        .with_state(hub)
}

/// Create the full application router: REST API, pad WebSocket and Swagger UI
pub fn create_app_routes(hub: Arc<PadHub>, cors_origins: &[String]) -> Router {
    let app = Router::new()
        // Mount API routes
        .nest("/api", create_api_routes(hub.clone()))
        // Mount the pad WebSocket
        .route("/ws", get(websocket_handler).with_state(hub))
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http());

    match cors_layer(cors_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
