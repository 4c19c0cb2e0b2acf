use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Current text and version of a pad
#[utoipa::path(
    get,
    path = "/api/v1/pads/{room}",
    params(
        ("room" = String, Path, description = "Pad name; lowercased and stripped to [a-z0-9_-], max 64 chars")
    ),
    responses(
        (status = 200, description = "Pad loaded", body = PadResponse),
        (status = 400, description = "Room name is empty after normalization", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn pad_snapshot_doc() {}

/// Connection, pad and process statistics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Diagnostics snapshot", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        pad_snapshot_doc,
        diagnostics_doc,
    ),
    components(
        schemas(HealthResponse, ReadyResponse, PadResponse, DiagnosticsResponse, ErrorResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
