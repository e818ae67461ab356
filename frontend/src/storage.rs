//! Durable key/value storage for the environment selector.
//!
//! The browser build persists to `localStorage`; native builds use a JSON file
//! and tests use [`MemoryStore`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, warn};

use crate::error::{ClientError, Result};

/// A small persisted key/value store.
pub trait EnvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str);
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a single persisted entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl EnvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ClientError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

/// JSON file store, the native stand-in for `localStorage`.
///
/// The whole map is rewritten on every `set`; the file only ever holds a
/// handful of keys.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl EnvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.read().ok()?;
        match self.read_entries() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!("Failed to read store {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| ClientError::Storage("file store lock poisoned".to_string()))?;
        // A corrupt file is replaced rather than blocking new writes
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    fn remove(&self, key: &str) {
        let Ok(_guard) = self.lock.write() else {
            return;
        };
        if let Ok(mut entries) = self.read_entries() {
            if entries.remove(key).is_some() {
                if let Err(e) = self.write_entries(&entries) {
                    warn!("Failed to update store {}: {}", self.path.display(), e);
                }
            }
        }
    }
}

/// `window.localStorage`, via gloo. Values are stored as plain strings so
/// they stay readable by other scripts on the page.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl EnvStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        use gloo_storage::Storage;
        gloo_storage::LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| ClientError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) {
        use gloo_storage::Storage;
        let _ = gloo_storage::LocalStorage::raw().remove_item(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("pice_env"), None);

        store.set("pice_env", "test").unwrap();
        assert_eq!(store.get("pice_env"), Some("test".to_string()));

        store.remove("pice_env");
        assert_eq!(store.get("pice_env"), None);
    }

    #[test]
    fn test_memory_store_with_entry() {
        let store = MemoryStore::with_entry("pice_env", "dev");
        assert_eq!(store.get("pice_env").as_deref(), Some("dev"));
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("pice_env"), None);
        store.set("pice_env", "local").unwrap();
        assert!(path.exists());

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("pice_env"), Some("local".to_string()));

        reopened.remove("pice_env");
        assert_eq!(store.get("pice_env"), None);
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_file_store_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("pice_env"), None);

        store.set("pice_env", "test").unwrap();
        assert_eq!(store.get("pice_env"), Some("test".to_string()));
    }
}
