use crate::{models::{ErrorResponse, PadResponse}, ws::{padhub::PadHub, roomid::RoomId}};
use axum::{extract::{State, Path}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::debug;

/// Look up a pad, loading it into memory if needed
pub async fn pad_snapshot(
    State(hub): State<Arc<PadHub>>,
    Path(room): Path<String>,
) -> Result<(StatusCode, Json<PadResponse>), (StatusCode, Json<ErrorResponse>)> {

    // Normalize the room name
    let room_id = match RoomId::parse(&room) {
        Some(room_id) => room_id,
        None => {
            debug!("Rejected pad lookup for invalid room '{}'", room);
            let status = StatusCode::BAD_REQUEST;
            return Err((status, Json(ErrorResponse {
                code: status.as_u16(),
                status: status.to_string(),
                error: format!("Invalid room '{}'", room),
            })));
        }
    };

    // Get the pad and read it under its lock
    let pad = hub.registry().get_or_load(&room_id).await;
    let state = pad.lock().await;

    Ok((
        StatusCode::OK,
        Json(PadResponse {
            room: room_id.to_string(),
            text: state.record.text.clone(),
            version: state.record.version,
            members: state.member_count(),
        }),
    ))
}
