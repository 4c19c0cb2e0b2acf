use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::db::padstore::PadStore;
use super::padregistry::PadRegistry;
use super::padsaver::PadSaver;

/// Everything the protocol handlers share: the room table, the write-behind
/// saver and a live connection counter. Built once in `main` and handed to
/// the router as state.
pub struct PadHub {
    registry: PadRegistry,
    saver: PadSaver,
    connections: AtomicUsize,
}

impl PadHub {
    pub fn new(store: Arc<dyn PadStore>, save_debounce: Duration) -> Self {
        Self {
            registry: PadRegistry::new(store.clone()),
            saver: PadSaver::new(store, save_debounce),
            connections: AtomicUsize::new(0),
        }
    }

    pub fn registry(&self) -> &PadRegistry {
        &self.registry
    }

    pub fn saver(&self) -> &PadSaver {
        &self.saver
    }

    pub fn connection_opened(&self) -> usize {
        self.connections.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn connection_closed(&self) -> usize {
        self.connections.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }
}
