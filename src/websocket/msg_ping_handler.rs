use tracing::debug;
use chrono::Utc;
use crate::models::{PingMessage, PongMessage, SendMessage};
use crate::ws::connctx::ConnCtx;

/// Handle PingMessage
pub async fn handle_ping_message(_ping_msg: &PingMessage, conn: &ConnCtx) {
    // Handle ping message - send a pong message back.
    debug!("Ping message received from connection {}", conn.conn_id);

    conn.send(SendMessage::Pong(PongMessage { date: Utc::now().to_rfc3339() }));
}
