//! Durable storage of the widget list.
//!
//! Only the projection `{coordinates, timestamp}` is stored; weather is always
//! re-fetched on startup.

use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};
use tempfile::NamedTempFile;

use crate::{
    error::PersistenceError,
    model::{Coordinate, PersistedWidget, Widget},
};

/// Name of the storage slot holding the widget list.
pub const WIDGETS_SLOT: &str = "weatherWidgets";

/// Whole-value byte storage keyed by name.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;
    fn clear(&self, key: &str) -> Result<(), PersistenceError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), PersistenceError> {
        (**self).clear(key)
    }
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        match fs::read(self.slot_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a temp file in the same directory, then renames over the slot.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.slot_path(key)).map_err(|e| e.error)?;

        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        self.slots.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), PersistenceError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct PersistenceGateway {
    storage: Box<dyn KeyValueStore>,
    max_widgets: usize,
}

impl PersistenceGateway {
    pub fn new(storage: Box<dyn KeyValueStore>, max_widgets: usize) -> Self {
        Self {
            storage,
            max_widgets,
        }
    }

    /// Replace the slot with the given widgets, in the given order.
    pub fn save(&self, widgets: &[Widget]) -> Result<(), PersistenceError> {
        let entries: Vec<PersistedWidget> = widgets.iter().map(PersistedWidget::from).collect();
        let bytes = serde_json::to_vec(&entries)?;

        self.storage.set(WIDGETS_SLOT, &bytes)
    }

    /// Saved entries, at most `max_widgets`. Never fails: unreadable or
    /// corrupt storage is logged and treated as empty.
    pub fn load(&self) -> Vec<PersistedWidget> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable saved widgets");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<PersistedWidget>, PersistenceError> {
        let Some(bytes) = self.storage.get(WIDGETS_SLOT)? else {
            return Ok(Vec::new());
        };

        let entries: Vec<PersistedWidget> = serde_json::from_slice(&bytes)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

        Ok(entries
            .into_iter()
            .take(self.max_widgets)
            .filter(|entry| {
                let Coordinate { latitude, longitude } = entry.coordinates;
                let in_range = Coordinate::new(latitude, longitude).is_some();
                if !in_range {
                    tracing::warn!(latitude, longitude, "skipping saved widget with invalid coordinates");
                }
                in_range
            })
            .collect())
    }

    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.storage.clear(WIDGETS_SLOT)
    }
}
