//! Guess persistence.
//!
//! Guesses are stored as one JSON array under a single key of a string
//! key-value store, in the shape of browser `localStorage`. Each save
//! replaces the whole list.

use crate::config::GuesserConfig;
use crate::model::Guess;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::warn;

/// Key the guess list lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "guesses";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// A string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if there is none.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Everything is lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let invalid = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || key.contains('\0');
        if invalid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

/// Where the session loads and saves the guess history.
pub trait GuessStore: Send + Sync + 'static {
    /// Previously saved guesses. Missing or unreadable data yields an empty
    /// list, never an error.
    fn load(&self) -> Vec<Guess>;

    /// Replace the saved list with `guesses`.
    fn save(&self, guesses: &[Guess]) -> Result<(), StorageError>;
}

/// Stores the guess list as JSON under one key of a [`KeyValueStore`].
#[derive(Debug)]
pub struct GuessRepository<K> {
    storage: K,
    key: String,
}

impl<K: KeyValueStore> GuessRepository<K> {
    pub fn new(storage: K) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: K, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Use the key named by `config`.
    pub fn from_config(storage: K, config: &GuesserConfig) -> Self {
        Self::with_key(storage, config.storage_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &K {
        &self.storage
    }

    fn try_load(&self) -> Result<Vec<Guess>, StorageError> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Vec::new());
        };
        let guesses: Vec<Guess> = serde_json::from_str(&raw)?;
        Ok(guesses)
    }
}

impl<K: KeyValueStore + 'static> GuessStore for GuessRepository<K> {
    fn load(&self) -> Vec<Guess> {
        match self.try_load() {
            Ok(guesses) if guesses.iter().all(Guess::is_finite) => guesses,
            Ok(_) => {
                warn!(key = %self.key, "stored guesses contain non-finite coordinates, ignoring");
                Vec::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to load stored guesses, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, guesses: &[Guess]) -> Result<(), StorageError> {
        let json = serde_json::to_string(guesses)?;
        self.storage.set_item(&self.key, &json)
    }
}
