use std::sync::Arc;
use axum::{
    extract::{State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use tracing::{info, warn, error, debug};
use futures_util::{StreamExt, SinkExt};

use crate::models::ReceivedMessage;
use crate::websocket::conn_close_handler::handle_conn_close;
use crate::websocket::msg_join_handler::handle_join_message;
use crate::websocket::msg_ping_handler::handle_ping_message;
use crate::websocket::msg_update_handler::handle_update_message;
use crate::ws::{connctx::ConnCtx, padhub::PadHub};


/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(hub): State<Arc<PadHub>>,
) -> Response {
    debug!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<PadHub>) {

    // Every connection gets its own id and outbox
    let (mut conn, mut outbox) = ConnCtx::channel();
    let open = hub.connection_opened();
    info!("WebSocket connection {} established ({} open)", conn.conn_id, open);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Drain the outbox into the socket from a separate task
    let conn_id = conn.conn_id;
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize message for connection {}: {}", conn_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Process incoming frames until the client goes away or the writer fails
    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_text_frame(&text, &mut conn, &hub).await,
                Some(Ok(Message::Binary(_))) => {
                    warn!("Ignoring binary frame from connection {}", conn.conn_id);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket error on connection {}: {}", conn.conn_id, e);
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    handle_conn_close(&mut conn, &hub).await;
    send_task.abort();
    let open = hub.connection_closed();
    info!("WebSocket connection {} terminated ({} open)", conn.conn_id, open);
}

/// Parse one text frame and dispatch it. Frames that do not parse are dropped.
pub async fn handle_text_frame(text: &str, conn: &mut ConnCtx, hub: &PadHub) {

    // Parse the incoming message as JSON
    let msg: ReceivedMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Failed to parse message from connection {}: {}", conn.conn_id, e);
            return;
        }
    };

    // Handle different message types
    match msg {
        ReceivedMessage::Join(join_msg) => handle_join_message(&join_msg, conn, hub).await,
        ReceivedMessage::Update(update_msg) => handle_update_message(&update_msg, conn, hub).await,
        ReceivedMessage::Ping(ping_msg) => handle_ping_message(&ping_msg, conn).await,
    }
}
