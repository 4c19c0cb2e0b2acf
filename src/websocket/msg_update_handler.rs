use tracing::debug;
use crate::models::{AckMessage, ApplyMessage, SendMessage, UpdateMessage};
use crate::ws::{connctx::ConnCtx, padhub::PadHub, roomid::RoomId};

/// Handle UpdateMessage
///
/// Last writer wins: the proposed text replaces the pad and bumps its
/// version. Other members get the new content, the sender only an ack so
/// its local buffer is left alone.
pub async fn handle_update_message(update_msg: &UpdateMessage, conn: &ConnCtx, hub: &PadHub) {

    // The update must target the room this connection is attached to
    let room_id = match RoomId::from_value(&update_msg.room) {
        Some(room_id) if conn.is_attached_to(&room_id) => room_id,
        _ => {
            debug!("Dropping update for room {} from connection {} (attached to {:?})", update_msg.room, conn.conn_id, conn.room());
            return;
        }
    };

    // Only string payloads are accepted
    let text = match update_msg.text.as_str() {
        Some(text) => text,
        None => {
            debug!("Dropping non-text update for pad '{}' from connection {}", room_id, conn.conn_id);
            return;
        }
    };

    // Check, Apply and Broadcast under the room lock
    let room = hub.registry().get_or_load(&room_id).await;
    {
        let mut state = room.lock().await;
        state.record.text = text.to_string();
        state.record.version += 1;
        let version = state.record.version;

        let apply = SendMessage::Apply(ApplyMessage {
            room: room_id.to_string(),
            text: state.record.text.clone(),
            version,
        });
        let receivers = state.broadcast_except(&conn.conn_id, &apply);
        conn.send(SendMessage::Ack(AckMessage { version }));

        debug!("Pad '{}' is now v{} ({} bytes, sent to {} peers)", room_id, version, text.len(), receivers);
    }

    // Schedule the write-behind
    hub.saver().notify(room).await;
}
