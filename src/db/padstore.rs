use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

use crate::models::PadRecord;
use crate::ws::roomid::RoomId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed pad record in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Durable home of pad records, one record per room.
pub trait PadStore: Send + Sync {
    /// Read the persisted record. `Ok(None)` means the room was never saved.
    fn load<'a>(&'a self, room: &'a RoomId) -> StoreFuture<'a, Option<PadRecord>>;

    /// Replace the persisted record.
    fn save<'a>(&'a self, room: &'a RoomId, record: &'a PadRecord) -> StoreFuture<'a, ()>;
}

/// Stores each pad as pretty-printed JSON at `<dir>/<room>.json`.
#[derive(Debug, Clone)]
pub struct FilePadStore {
    dir: PathBuf,
}

impl FilePadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the data directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })
    }

    pub fn pad_path(&self, room: &RoomId) -> PathBuf {
        self.dir.join(format!("{}.json", room))
    }

    async fn read_record(&self, room: &RoomId) -> Result<Option<PadRecord>, StoreError> {
        let path = self.pad_path(room);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    async fn write_record(&self, room: &RoomId, record: &PadRecord) -> Result<(), StoreError> {
        let path = self.pad_path(room);
        let json = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        self.ensure_dir().await?;

        // Write next to the target and rename so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote pad '{}' v{} ({} bytes)", room, record.version, json.len());
        Ok(())
    }
}

impl PadStore for FilePadStore {
    fn load<'a>(&'a self, room: &'a RoomId) -> StoreFuture<'a, Option<PadRecord>> {
        Box::pin(self.read_record(room))
    }

    fn save<'a>(&'a self, room: &'a RoomId, record: &'a PadRecord) -> StoreFuture<'a, ()> {
        Box::pin(self.write_record(room, record))
    }
}

/// Keeps records in process memory. Nothing survives a restart; it also
/// counts calls so the write-behind behaviour can be observed.
#[derive(Debug, Default)]
pub struct MemoryPadStore {
    records: Mutex<HashMap<RoomId, PadRecord>>,
    saves: Mutex<Vec<(RoomId, PadRecord)>>,
    loads: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryPadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted record, as if it had been saved by an earlier process.
    pub fn with_record(self, room: RoomId, record: PadRecord) -> Self {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(room, record);
        self
    }

    pub fn record(&self, room: &RoomId) -> Option<PadRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room)
            .cloned()
    }

    /// Every successful save, in the order it happened.
    pub fn saves(&self) -> Vec<(RoomId, PadRecord)> {
        self.saves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl PadStore for MemoryPadStore {
    fn load<'a>(&'a self, room: &'a RoomId) -> StoreFuture<'a, Option<PadRecord>> {
        Box::pin(async move {
            let _ = self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.record(room))
        })
    }

    fn save<'a>(&'a self, room: &'a RoomId, record: &'a PadRecord) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("saves disabled".to_string()));
            }
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(room.clone(), record.clone());
            self.saves
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((room.clone(), record.clone()));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    #[tokio::test]
    async fn file_store_missing_pad_is_none() {
        let dir = tempdir().unwrap();
        let store = FilePadStore::new(dir.path());
        assert!(store.load(&room("nothing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_save_then_load() {
        let dir = tempdir().unwrap();
        let store = FilePadStore::new(dir.path().join("pads"));
        let record = PadRecord::new("hello\nworld", 7);

        store.save(&room("r1"), &record).await.unwrap();
        assert_eq!(store.load(&room("r1")).await.unwrap(), Some(record));

        let raw = std::fs::read_to_string(store.pad_path(&room("r1"))).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello\nworld", "version": 7}));
        assert!(!dir.path().join("pads").join("r1.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_record() {
        let dir = tempdir().unwrap();
        let store = FilePadStore::new(dir.path());
        std::fs::write(store.pad_path(&room("bad")), b"{ not json").unwrap();

        let err = store.load(&room("bad")).await.unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn file_store_accepts_partial_record() {
        let dir = tempdir().unwrap();
        let store = FilePadStore::new(dir.path());
        std::fs::write(store.pad_path(&room("old")), br#"{"text":"legacy"}"#).unwrap();

        assert_eq!(
            store.load(&room("old")).await.unwrap(),
            Some(PadRecord::new("legacy", 0))
        );
    }

    #[tokio::test]
    async fn memory_store_counts_and_fails_on_demand() {
        let store = MemoryPadStore::new().with_record(room("r1"), PadRecord::new("hi", 3));
        assert_eq!(store.load(&room("r1")).await.unwrap(), Some(PadRecord::new("hi", 3)));
        assert_eq!(store.load_count(), 1);

        store.set_fail_saves(true);
        assert!(store.save(&room("r1"), &PadRecord::new("x", 4)).await.is_err());
        assert!(store.saves().is_empty());

        store.set_fail_saves(false);
        store.save(&room("r1"), &PadRecord::new("x", 4)).await.unwrap();
        assert_eq!(store.saves(), vec![(room("r1"), PadRecord::new("x", 4))]);
    }
}
