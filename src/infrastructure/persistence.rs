//! Local key-value persistence.
//!
//! Values are stored as human-readable JSON. [`FileStore`] keeps one file per
//! key under the data directory; [`MemoryStore`] keeps everything in memory.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key under which the calculator history is stored.
pub const CALCULATOR_HISTORY_KEY: &str = "calculatorHistory";
/// Key under which the task list is stored.
pub const TODOS_KEY: &str = "todos";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid data under key '{key}': {source}")]
    Format {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String values addressed by key.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a key. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StorageError::Write { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove { path, source }),
        }
    }
}

/// Keeps values in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Reads and deserializes the value stored under `key`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(content) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StorageError::Format {
            key: key.to_string(),
            source,
        })
}

/// Serializes `value` as pretty JSON and stores it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Format {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}

/// Store whose writes always fail, for exercising best-effort saving.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: PathBuf::from(format!("{key}.json")),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::Remove {
            path: PathBuf::from(format!("{key}.json")),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}
