use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::models::{PadRecord, PresenceMessage, SendMessage};
use super::roomid::RoomId;

/// Outbound queue of a single connection.
// TODO: unbounded, so a reader that never drains grows it without limit.
// Switch to a bounded channel and drop the connection when it fills up.
pub type Outbox = mpsc::UnboundedSender<SendMessage>;

/// Live state of one pad. Everything in here is only touched while the
/// room lock is held, which serializes edits and membership changes per room.
#[derive(Debug, Default)]
pub struct RoomState {
    pub record: PadRecord,
    pub members: HashMap<Uuid, Outbox>,
}

impl RoomState {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Queue a message for one member. A closed outbox means the connection
    /// is going away; its disconnect will clean up the membership.
    pub fn send_to(&self, conn_id: &Uuid, msg: SendMessage) {
        if let Some(outbox) = self.members.get(conn_id) {
            if outbox.send(msg).is_err() {
                debug!("Outbox of connection {} is closed", conn_id);
            }
        }
    }

    /// Queue a message for every member except `skip`.
    pub fn broadcast_except(&self, skip: &Uuid, msg: &SendMessage) -> usize {
        let mut sent = 0;
        for (conn_id, outbox) in self.members.iter().filter(|(id, _)| *id != skip) {
            if outbox.send(msg.clone()).is_ok() {
                sent += 1;
            } else {
                debug!("Outbox of connection {} is closed", conn_id);
            }
        }
        sent
    }

    /// Tell every member how many connections are attached.
    pub fn broadcast_presence(&self) {
        let msg = SendMessage::Presence(PresenceMessage {
            count: self.member_count(),
        });
        for (conn_id, outbox) in &self.members {
            if outbox.send(msg.clone()).is_err() {
                debug!("Outbox of connection {} is closed", conn_id);
            }
        }
    }
}

#[derive(Debug)]
pub struct PadRoom {
    id: RoomId,
    state: Mutex<RoomState>,
    save_lock: Mutex<()>,
}

impl PadRoom {
    pub fn new(id: RoomId, record: PadRecord) -> Self {
        Self {
            id,
            state: Mutex::new(RoomState {
                record,
                members: HashMap::new(),
            }),
            save_lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub async fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().await
    }

    /// Snapshot of the current record.
    pub async fn record(&self) -> PadRecord {
        self.state.lock().await.record.clone()
    }

    pub async fn member_count(&self) -> usize {
        self.state.lock().await.member_count()
    }

    /// Held for the duration of a durable write so writes of one room never overlap.
    pub async fn lock_save(&self) -> MutexGuard<'_, ()> {
        self.save_lock.lock().await
    }
}
