use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Durable key-value primitive behind the record store. One JSON
/// document per key; no partial writes.
pub trait StorageBackend: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Filesystem-backed storage, one file per key under a data directory.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) => Err(StoreError::StorageUnavailable(format!(
                "failed to read '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value).map_err(|e| {
            StoreError::StorageUnavailable(format!("failed to write '{}': {}", key, e))
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory backend for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}

/// Reads a stored collection. Missing or corrupt state deserializes to
/// an empty collection so a bad document never takes the portal down.
pub(crate) fn read_json<T: DeserializeOwned>(backend: &dyn StorageBackend, key: &str) -> Vec<T> {
    let raw = match backend.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Storage read failed for '{}', treating as empty: {}", key, e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Corrupt collection '{}', self-healing to empty: {}", key, e);
            Vec::new()
        }
    }
}

/// Serializes and writes a whole collection back under its key.
pub(crate) fn write_json<T: Serialize>(
    backend: &dyn StorageBackend,
    key: &str,
    records: &[T],
) -> Result<()> {
    let raw = serde_json::to_string(records)?;
    backend.store(key, &raw)
}
