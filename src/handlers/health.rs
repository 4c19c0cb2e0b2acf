use axum::{extract::State, Json};
use std::sync::Arc;
use crate::models::{HealthResponse, ReadyResponse};
use crate::ws::padhub::PadHub;
use tracing::debug;

/// Health check endpoint
pub async fn health_check(State(hub): State<Arc<PadHub>>) -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        ok: true,
        rooms: hub.registry().room_count().await,
    })
}

/// Readiness check endpoint
pub async fn ready_check() -> Json<ReadyResponse> {
    debug!("Readiness check requested");
    Json(ReadyResponse {
        status: "ok".to_string(),
        message: "Service is ready".to_string(),
    })
}
