//! # Storage Port
//!
//! Key-value storage for serialized documents.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storage trait                                                          │
//! │  ├── read(key)            → Ok(Some(doc)) | Ok(None) when absent        │
//! │  └── write(key, doc)      → Ok(()) | Err(StoreError)                    │
//! │                                                                         │
//! │  MemoryStorage   HashMap behind a Mutex (tests, embedding)              │
//! │  FileStorage     <dir>/<key>.json, written to a temp file then renamed  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// A key-value store of documents.
pub trait Storage: Send + Sync {
    /// Reads the document under `key`. Absence is not an error.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the document under `key`.
    fn write(&self, key: &str, document: &str) -> StoreResult<()>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, document: &str) -> StoreResult<()> {
        (**self).write(key, document)
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that holds `entries` and rejects every write.
    pub fn read_only(entries: HashMap<String, String>) -> Self {
        MemoryStorage {
            entries: Mutex::new(entries),
            read_only: true,
        }
    }

    /// Storage pre-filled with one document.
    pub fn with_entry(key: &str, document: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(key.to_string(), document.to_string());
        }
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, document: &str) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::Unavailable("memory storage is read-only".into()));
        }

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage lock poisoned".into()))?;
        entries.insert(key.to_string(), document.to_string());
        Ok(())
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir`, which is created on first write if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(document) => {
                debug!(?path, bytes = document.len(), "Read document");
                Ok(Some(document))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, document: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        // A reader never sees a half-written file
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(document.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        debug!(?path, bytes = document.len(), "Wrote document");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
