use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, warn};

use crate::db::padstore::PadStore;
use crate::models::PadRecord;
use super::padroom::PadRoom;
use super::roomid::RoomId;

/// In-memory table of every pad touched since startup.
///
/// Rooms are loaded from the store on first access and stay resident for
/// the lifetime of the process, even with no members attached.
pub struct PadRegistry {
    store: Arc<dyn PadStore>,
    rooms: RwLock<HashMap<RoomId, Arc<OnceCell<Arc<PadRoom>>>>>,
}

impl PadRegistry {
    pub fn new(store: Arc<dyn PadStore>) -> Self {
        Self {
            store,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Return the resident room, loading it from the store on first access.
    ///
    /// Concurrent callers for the same room share a single load. The map
    /// lock is only held to find or insert the slot, never across store I/O,
    /// so a slow load does not hold up other rooms.
    pub async fn get_or_load(&self, id: &RoomId) -> Arc<PadRoom> {
        let slot = {
            let rooms = self.rooms.read().await;
            rooms.get(id).cloned()
        };
        let slot = match slot {
            Some(slot) => slot,
            None => {
                let mut rooms = self.rooms.write().await;
                rooms.entry(id.clone()).or_default().clone()
            }
        };

        let room = slot.get_or_init(|| self.load_room(id)).await;
        room.clone()
    }

    /// Return the room only if it is already resident.
    pub async fn get(&self, id: &RoomId) -> Option<Arc<PadRoom>> {
        let rooms = self.rooms.read().await;
        rooms.get(id).and_then(|slot| slot.get().cloned())
    }

    /// Number of rooms resident in memory.
    pub async fn room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.values().filter(|slot| slot.initialized()).count()
    }

    async fn load_room(&self, id: &RoomId) -> Arc<PadRoom> {
        let record = match self.store.load(id).await {
            Ok(Some(record)) => {
                info!("Loaded pad '{}' at v{}", id, record.version);
                record
            }
            Ok(None) => {
                info!("No stored pad '{}', starting empty", id);
                PadRecord::default()
            }
            Err(e) => {
                warn!("Discarding unreadable pad '{}', starting empty: {}", id, e);
                PadRecord::default()
            }
        };
        Arc::new(PadRoom::new(id.clone(), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::padstore::{FilePadStore, MemoryPadStore};
    use tempfile::tempdir;

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    #[tokio::test]
    async fn unknown_room_starts_empty() {
        let registry = PadRegistry::new(Arc::new(MemoryPadStore::new()));
        let pad = registry.get_or_load(&room("fresh")).await;
        assert_eq!(pad.record().await, PadRecord::default());
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn lazy_load_is_idempotent() {
        let store = Arc::new(
            MemoryPadStore::new().with_record(room("r1"), PadRecord::new("hi", 3)),
        );
        let registry = PadRegistry::new(store.clone());

        let first = registry.get_or_load(&room("r1")).await;
        let second = registry.get_or_load(&room("r1")).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.record().await, PadRecord::new("hi", 3));
        assert_eq!(second.record().await, PadRecord::new("hi", 3));
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_access_loads_once() {
        let store = Arc::new(
            MemoryPadStore::new().with_record(room("busy"), PadRecord::new("x", 9)),
        );
        let registry = Arc::new(PadRegistry::new(store.clone()));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry.get_or_load(&room("busy")).await
            }));
        }
        let mut rooms = Vec::new();
        for task in tasks {
            rooms.push(task.await.unwrap());
        }

        assert!(rooms.iter().all(|r| Arc::ptr_eq(r, &rooms[0])));
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn loaded_room_keeps_live_state() {
        let registry = PadRegistry::new(Arc::new(MemoryPadStore::new()));
        let pad = registry.get_or_load(&room("r1")).await;
        pad.lock().await.record = PadRecord::new("edited", 1);

        let again = registry.get_or_load(&room("r1")).await;
        assert_eq!(again.record().await, PadRecord::new("edited", 1));
    }

    #[tokio::test]
    async fn corrupt_record_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let store = FilePadStore::new(dir.path());
        std::fs::write(store.pad_path(&room("broken")), b"\x00garbage").unwrap();
        let registry = PadRegistry::new(Arc::new(store));

        let pad = registry.get_or_load(&room("broken")).await;
        assert_eq!(pad.record().await, PadRecord::default());
    }

    #[tokio::test]
    async fn get_does_not_load() {
        let store = Arc::new(MemoryPadStore::new());
        let registry = PadRegistry::new(store.clone());
        assert!(registry.get(&room("r1")).await.is_none());
        assert_eq!(store.load_count(), 0);
        assert_eq!(registry.room_count().await, 0);
    }
}
