use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{PlacementState, WindowId};
use crate::error::Error;

/// Per-window placement state, keyed by window identity.
pub trait PlacementStore: Send + Sync {
    fn get(&self, id: WindowId) -> Option<PlacementState>;
    fn update(&self, id: WindowId, state: PlacementState);
    fn evict(&self, id: WindowId);
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: DashMap<WindowId, PlacementState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl PlacementStore for MemoryStore {
    fn get(&self, id: WindowId) -> Option<PlacementState> {
        self.map.get(&id).map(|entry| *entry.value())
    }

    fn update(&self, id: WindowId, state: PlacementState) {
        self.map.insert(id, state);
    }

    fn evict(&self, id: WindowId) {
        self.map.remove(&id);
    }
}

/// Store persisted as JSON so state survives between short-lived processes.
///
/// Window handles can be reused by the OS after a window closes; a reused
/// handle almost always fails the drift check and starts fresh.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Load state from `path`. A missing or unreadable file starts empty.
    pub fn open(path: &Path) -> Self {
        let inner = MemoryStore::new();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<BTreeMap<WindowId, PlacementState>>(&json) {
                Ok(entries) => {
                    for (id, state) in entries {
                        inner.update(id, state);
                    }
                    debug!("Loaded {} window state(s) from {}", inner.len(), path.display());
                }
                Err(e) => warn!("Ignoring corrupt window state {}: {}", path.display(), e),
            },
            Err(e) => debug!("No window state at {}: {}", path.display(), e),
        }
        Self {
            path: path.to_path_buf(),
            inner,
        }
    }

    pub fn save(&self) -> Result<(), Error> {
        let entries: BTreeMap<WindowId, PlacementState> = self
            .inner
            .map
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

impl PlacementStore for FileStore {
    fn get(&self, id: WindowId) -> Option<PlacementState> {
        self.inner.get(id)
    }

    fn update(&self, id: WindowId, state: PlacementState) {
        self.inner.update(id, state);
    }

    fn evict(&self, id: WindowId) {
        self.inner.evict(id);
    }
}
