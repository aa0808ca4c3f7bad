//! Durable key-value store abstraction
//!
//! The calibration engine persists a single small record. The store is an
//! injected collaborator so the engine is constructible and testable without
//! a real storage backend.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

/// Synchronous string key-value store
pub trait KeyValueStore {
    /// Read a value, `None` when absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, overwriting any prior one
    fn set(&mut self, key: &str, value: &str);

    /// Delete a key entirely
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// File-backed store: one file per key under a directory.
///
/// IO failures degrade to absent reads and dropped writes with a warning;
/// persistence is best-effort and must never take the pipeline down.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("failed to create store directory {:?}: {}", self.dir, e);
            return;
        }
        if let Err(e) = std::fs::write(self.path_for(key), value) {
            warn!("failed to persist key {}: {}", key, e);
        }
    }

    fn remove(&mut self, key: &str) {
        let path = self.path_for(key);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove key {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "v1");
        assert_eq!(store.get("k"), Some("v1".to_string()));

        store.set("k", "v2");
        assert_eq!(store.get("k"), Some("v2".to_string()));

        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());

        store.set("calibration", "{\"baseline\":1.0}");
        assert_eq!(
            store.get("calibration"),
            Some("{\"baseline\":1.0}".to_string())
        );

        store.remove("calibration");
        assert_eq!(store.get("calibration"), None);
    }

    #[test]
    fn test_file_store_remove_missing_is_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        store.remove("never-written");
    }
}
