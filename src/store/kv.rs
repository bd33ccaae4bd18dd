//! Key-value persistence primitives backing the local cart store.
//!
//! Neither operation surfaces errors: a failed read is reported as absence
//! and a failed write is logged and dropped, the same contract browser
//! local storage gives the storefront.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};
use uuid::Uuid;

/// Namespace UUID for deriving per-key file names.
const STORE_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3f, 0x1c, 0x5e, 0x92, 0x47, 0xb0, 0x4d, 0x2a, 0x9c, 0x61, 0x0e, 0xd8, 0x7a, 0x15, 0xc4, 0x33,
]);

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    /// Drop `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

/// Compute a UUID v5 from a storage key. Deterministic, so the same key
/// always maps to the same file.
pub fn compute_key_uuid(key: &str) -> String {
    Uuid::new_v5(&STORE_NAMESPACE, key.as_bytes()).to_string()
}

/// Stores each key as `<dir>/<uuid-v5(key)>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", compute_key_uuid(key)))
    }

}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!("Failed to create directory {}: {}", self.dir.display(), e);
            return;
        }
        let path = self.path_for(key);
        match fs::write(&path, value) {
            Ok(()) => debug!("Stored {} at {}", key, path.display()),
            Err(e) => warn!("Failed to write {}: {}", path.display(), e),
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if !path.exists() {
            return;
        }
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed {} at {}", key, path.display()),
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.read() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => {
                warn!("Memory store lock poisoned; treating {} as absent", key);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value.to_string());
            }
            Err(_) => warn!("Memory store lock poisoned; dropping write to {}", key),
        }
    }

    fn remove(&self, key: &str) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.remove(key);
            }
            Err(_) => warn!("Memory store lock poisoned; dropping removal of {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compute_key_uuid_is_stable() {
        let a = compute_key_uuid("cart:1");
        assert_eq!(a, compute_key_uuid("cart:1"));
        assert_ne!(a, compute_key_uuid("cart:2"));
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_file_store_creates_dir_on_write() {
        let tmp = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(tmp.path().join("nested/carts"));

        assert_eq!(store.get("cart:1"), None);
        store.set("cart:1", "{}");
        assert_eq!(store.get("cart:1").as_deref(), Some("{}"));
        assert!(store.path_for("cart:1").exists());

        store.remove("cart:1");
        assert_eq!(store.get("cart:1"), None);
    }

    #[test]
    fn test_file_store_handles_unsafe_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(tmp.path());

        store.set("cart:../../etc/passwd", "x");
        assert_eq!(store.get("cart:../../etc/passwd").as_deref(), Some("x"));
        assert_eq!(store.path_for("cart:../../etc/passwd").parent(), Some(tmp.path()));
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemoryKeyValueStore::new();
        store.set("k", "1");
        store.set("k", "2");
        assert_eq!(store.get("k").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.remove("k");
        store.remove("missing");
        assert!(store.is_empty());
    }
}
