use tracing::{debug, info};
use crate::models::{InitMessage, JoinMessage, SendMessage};
use crate::websocket::conn_close_handler::leave_room;
use crate::ws::{connctx::ConnCtx, padhub::PadHub, roomid::RoomId};

/// Handle JoinMessage
///
/// Moves the connection into the requested pad, leaving its previous pad
/// first. The joiner alone gets the current text and version; every member,
/// the joiner included, gets the new presence count.
pub async fn handle_join_message(join_msg: &JoinMessage, conn: &mut ConnCtx, hub: &PadHub) {

    // Normalize the requested room, ignore the join if nothing is left
    let room_id = match RoomId::from_value(&join_msg.room) {
        Some(room_id) => room_id,
        None => {
            debug!("Ignoring join with invalid room {} from connection {}", join_msg.room, conn.conn_id);
            return;
        }
    };

    // Leave the previous room, if it is a different one
    if !conn.is_attached_to(&room_id) {
        if let Some(previous) = conn.detach() {
            leave_room(hub, &previous, conn).await;
        }
    }

    // Join the room, loading its pad if this is the first access
    let room = hub.registry().get_or_load(&room_id).await;
    {
        let mut state = room.lock().await;
        let _ = state.members.insert(conn.conn_id, conn.outbox().clone());

        conn.send(SendMessage::Init(InitMessage {
            room: room_id.to_string(),
            text: state.record.text.clone(),
            version: state.record.version,
        }));
        state.broadcast_presence();

        info!("Connection {} joined pad '{}' ({} connected)", conn.conn_id, room_id, state.member_count());
    }
    conn.attach(room_id);
}
