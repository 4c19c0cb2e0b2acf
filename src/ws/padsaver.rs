use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::db::padstore::PadStore;
use super::padroom::PadRoom;
use super::roomid::RoomId;

/// A debounce timer that has been armed but has not fired yet.
struct PendingSave {
    generation: u64,
    room: Arc<PadRoom>,
    handle: JoinHandle<()>,
}

struct SaverInner {
    store: Arc<dyn PadStore>,
    delay: Duration,
    pending: Mutex<HashMap<RoomId, PendingSave>>,
    next_generation: AtomicU64,
    // Shared by every timer write in progress; `flush` takes it exclusively
    writes: RwLock<()>,
}

/// Write-behind persistence with one debounce timer per room.
///
/// Every edit re-arms the room's timer, cancelling the previous one, so a
/// burst of edits ends in a single write of whatever the room holds when
/// the timer finally fires. A fired timer leaves the pending table before
/// writing, so re-arming never aborts a write that is already under way.
#[derive(Clone)]
pub struct PadSaver {
    inner: Arc<SaverInner>,
}

impl PadSaver {
    pub fn new(store: Arc<dyn PadStore>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(SaverInner {
                store,
                delay,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                writes: RwLock::new(()),
            }),
        }
    }

    /// Arm (or re-arm) the save timer for `room`.
    pub async fn notify(&self, room: Arc<PadRoom>) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.inner.pending.lock().await;

        if let Some(previous) = pending.remove(room.id()) {
            previous.handle.abort();
        }

        let inner = self.inner.clone();
        let timer_room = room.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            let _writing = {
                let mut pending = inner.pending.lock().await;
                let current = pending.get(timer_room.id()).map(|entry| entry.generation);
                if current != Some(generation) {
                    // Superseded by a newer timer
                    return;
                }
                let _ = pending.remove(timer_room.id());
                // Taken before the entry is gone from view so `flush` cannot miss this write
                inner.writes.read().await
            };
            inner.save(&timer_room).await;
        });

        let _ = pending.insert(
            room.id().clone(),
            PendingSave {
                generation,
                room,
                handle,
            },
        );
    }

    /// Cancel every armed timer and write those rooms right away, then wait
    /// for timer writes that were already under way. Returns the number of
    /// armed timers that were flushed.
    pub async fn flush(&self) -> usize {
        let drained: Vec<PendingSave> = {
            let mut pending = self.inner.pending.lock().await;
            pending.drain().map(|(_, entry)| entry).collect()
        };

        let count = drained.len();
        for entry in drained {
            entry.handle.abort();
            self.inner.save(&entry.room).await;
        }
        drop(self.inner.writes.write().await);

        if count > 0 {
            info!("Flushed {} pending pad save(s)", count);
        }
        count
    }

    /// Number of rooms with an armed timer.
    pub async fn pending_count(&self) -> usize {
        self.inner.pending.lock().await.len()
    }
}

impl SaverInner {
    async fn save(&self, room: &PadRoom) {
        let _guard = room.lock_save().await;
        let record = room.record().await;

        match self.store.save(room.id(), &record).await {
            Ok(()) => debug!("Saved pad '{}' at v{}", room.id(), record.version),
            Err(e) => error!("[{}] persist error: {}", room.id(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::padstore::{MemoryPadStore, StoreFuture};
    use crate::models::PadRecord;

    const DELAY: Duration = Duration::from_millis(250);

    fn setup() -> (Arc<MemoryPadStore>, PadSaver, Arc<PadRoom>) {
        let store = Arc::new(MemoryPadStore::new());
        let saver = PadSaver::new(store.clone(), DELAY);
        let room = Arc::new(PadRoom::new(RoomId::parse("r1").unwrap(), PadRecord::default()));
        (store, saver, room)
    }

    /// Memory store whose writes take a while to land.
    struct SlowStore {
        inner: MemoryPadStore,
        latency: Duration,
    }

    impl PadStore for SlowStore {
        fn load<'a>(&'a self, room: &'a RoomId) -> StoreFuture<'a, Option<PadRecord>> {
            self.inner.load(room)
        }

        fn save<'a>(&'a self, room: &'a RoomId, record: &'a PadRecord) -> StoreFuture<'a, ()> {
            Box::pin(async move {
                tokio::time::sleep(self.latency).await;
                self.inner.save(room, record).await
            })
        }
    }

    async fn edit(room: &PadRoom, text: &str) {
        let mut state = room.lock().await;
        state.record.text = text.to_string();
        state.record.version += 1;
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_is_written_once() {
        let (store, saver, room) = setup();

        for i in 0..10 {
            edit(&room, &format!("draft {i}")).await;
            saver.notify(room.clone()).await;
            tokio::time::sleep(DELAY / 5).await;
        }
        assert!(store.saves().is_empty());
        assert_eq!(saver.pending_count().await, 1);

        tokio::time::sleep(DELAY * 2).await;

        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].1, PadRecord::new("draft 9", 10));
        assert_eq!(saver.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_writes_state_at_fire_time() {
        let (store, saver, room) = setup();

        edit(&room, "first").await;
        saver.notify(room.clone()).await;
        // Edited again without re-arming: the write still picks this up
        edit(&room, "second").await;

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(store.saves(), vec![(room.id().clone(), PadRecord::new("second", 2))]);
    }

    #[tokio::test(start_paused = true)]
    async fn separated_edits_are_written_separately() {
        let (store, saver, room) = setup();

        edit(&room, "a").await;
        saver.notify(room.clone()).await;
        tokio::time::sleep(DELAY * 2).await;

        edit(&room, "b").await;
        saver.notify(room.clone()).await;
        tokio::time::sleep(DELAY * 2).await;

        let versions: Vec<u64> = store.saves().iter().map(|(_, r)| r.version).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_retried_by_next_edit() {
        let (store, saver, room) = setup();
        store.set_fail_saves(true);

        edit(&room, "lost").await;
        saver.notify(room.clone()).await;
        tokio::time::sleep(DELAY * 2).await;
        assert!(store.saves().is_empty());
        assert_eq!(saver.pending_count().await, 0);

        store.set_fail_saves(false);
        edit(&room, "kept").await;
        saver.notify(room.clone()).await;
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(store.record(room.id()), Some(PadRecord::new("kept", 2)));
    }

    #[tokio::test(start_paused = true)]
    async fn rooms_have_independent_timers() {
        let (store, saver, room) = setup();
        let other = Arc::new(PadRoom::new(RoomId::parse("r2").unwrap(), PadRecord::default()));

        edit(&room, "one").await;
        saver.notify(room.clone()).await;
        edit(&other, "two").await;
        saver.notify(other.clone()).await;
        assert_eq!(saver.pending_count().await, 2);

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(store.saves().len(), 2);
        assert_eq!(store.record(other.id()), Some(PadRecord::new("two", 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_pending_rooms_immediately() {
        let (store, saver, room) = setup();

        edit(&room, "unsaved").await;
        saver.notify(room.clone()).await;
        assert_eq!(saver.flush().await, 1);
        assert_eq!(store.saves().len(), 1);

        // The cancelled timer must not write a second time
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(store.saves().len(), 1);
        assert_eq!(saver.flush().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_waits_for_write_already_under_way() {
        let store = Arc::new(SlowStore {
            inner: MemoryPadStore::new(),
            latency: Duration::from_millis(100),
        });
        let saver = PadSaver::new(store.clone(), DELAY);
        let room = Arc::new(PadRoom::new(RoomId::parse("r1").unwrap(), PadRecord::default()));

        edit(&room, "last words").await;
        saver.notify(room.clone()).await;

        // The timer has fired and its write is still in progress
        tokio::time::sleep(DELAY + Duration::from_millis(10)).await;
        assert_eq!(saver.pending_count().await, 0);
        assert!(store.inner.saves().is_empty());

        assert_eq!(saver.flush().await, 0);
        assert_eq!(
            store.inner.saves(),
            vec![(room.id().clone(), PadRecord::new("last words", 1))]
        );
    }
}
