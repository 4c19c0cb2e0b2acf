use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::SendMessage;
use super::padroom::Outbox;
use super::roomid::RoomId;

/// Per-connection bookkeeping: who we are, where to send, and which pad
/// (if any) the connection is attached to.
#[derive(Debug)]
pub struct ConnCtx {
    pub conn_id: Uuid,
    room: Option<RoomId>,
    outbox: Outbox,
}

impl ConnCtx {
    pub fn new(outbox: Outbox) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            room: None,
            outbox,
        }
    }

    /// A fresh context together with the receiving end of its outbox.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SendMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn is_attached_to(&self, room: &RoomId) -> bool {
        self.room.as_ref() == Some(room)
    }

    pub fn attach(&mut self, room: RoomId) {
        self.room = Some(room);
    }

    pub fn detach(&mut self) -> Option<RoomId> {
        self.room.take()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Queue a message for this connection only.
    pub fn send(&self, msg: SendMessage) {
        if self.outbox.send(msg).is_err() {
            debug!("Outbox of connection {} is closed", self.conn_id);
        }
    }
}
