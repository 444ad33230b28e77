//! Persistent key/value storage for cache entries
//!
//! The cache layer only needs string get/set/remove. `FileStore` backs each
//! key with one file under the state directory; `MemoryStore` keeps entries
//! in a map for tests and `--no-cache` runs.
//!
//! Writes are best-effort: a store that cannot persist an entry logs the
//! failure and keeps going, it never fails the embedding.

use crate::error::{InsetError, InsetResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Synchronous string key/value store
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key, `None` if absent
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, overwriting any prior entry
    fn set(&self, key: &str, value: &str);

    /// Remove a key; absent keys are a no-op
    fn remove(&self, key: &str);
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// File-backed store, one file per key
///
/// Keys are URLs and other strings unfit for filenames, so files are named
/// by the SHA256 of the key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating it if needed
    pub fn open(dir: PathBuf) -> InsetResult<Self> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| InsetError::io(format!("creating store dir {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    /// Default store location under the user state directory
    pub fn default_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inset")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                debug!("Failed to read store entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.entry_path(key);
        if let Err(e) = std::fs::write(&path, value) {
            debug!("Failed to write store entry {}: {}", path.display(), e);
        }
    }

    fn remove(&self, key: &str) {
        let path = self.entry_path(key);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("Failed to remove store entry {}: {}", path.display(), e);
            }
        }
    }
}

/// Probe the persistent store, reporting what the environment lacks
pub fn open_persistent_store(dir: Option<&Path>) -> InsetResult<FileStore> {
    let dir = dir.map(Path::to_path_buf).unwrap_or_else(FileStore::default_dir);
    FileStore::open(dir).map_err(|e| {
        debug!("Persistent store unavailable: {}", e);
        InsetError::FeatureUnsupported {
            lacking: "local storage".to_string(),
        }
    })
}
