use tracing::info;
use crate::ws::{connctx::ConnCtx, padhub::PadHub, roomid::RoomId};

/// Handle a closed connection: leave its pad, if any. The pad itself is
/// untouched and pending saves keep running.
pub async fn handle_conn_close(conn: &mut ConnCtx, hub: &PadHub) {
    if let Some(room_id) = conn.detach() {
        leave_room(hub, &room_id, conn).await;
    }
}

/// Remove the connection from a pad's members and tell the rest.
pub async fn leave_room(hub: &PadHub, room_id: &RoomId, conn: &ConnCtx) {
    let room = match hub.registry().get(room_id).await {
        Some(room) => room,
        None => return,
    };

    let mut state = room.lock().await;
    if state.members.remove(&conn.conn_id).is_some() {
        state.broadcast_presence();
        info!("Connection {} left pad '{}' ({} connected)", conn.conn_id, room_id, state.member_count());
    }
}
