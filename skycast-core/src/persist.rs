//! Durable key-value storage for small preference blobs (theme flag,
//! favorites list).
//!
//! The layer is deliberately forgiving: a missing or corrupt value falls back
//! to the caller's default, and a failed write is logged and swallowed so the
//! app continues with in-memory state for that key.

use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::PersistError;

/// Key for the persisted dark-mode boolean.
pub const KEY_DARK_MODE: &str = "dark_mode";
/// Key for the persisted favorites array.
pub const KEY_FAVORITES: &str = "favorites";

/// Raw string storage keyed by a fixed name.
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Read the raw value for `key`, `None` when nothing was stored yet.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write the raw value for `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Load `key`, falling back to `default` on any read or parse failure.
pub fn load<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str, default: T) -> T {
    match store.read(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "ignoring malformed persisted value");
                default
            }
        },
        Ok(None) => default,
        Err(err) => {
            tracing::warn!(key, %err, "failed to read persisted value");
            default
        }
    }
}

/// Persist `value` under `key`. Failures are logged and swallowed.
pub fn save<T: Serialize>(store: &dyn PreferenceStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(key, %err, "failed to serialize value for persistence");
            return;
        }
    };

    if let Err(err) = store.write(key, &raw) {
        tracing::warn!(key, %err, "failed to persist value");
    }
}

/// File-backed store: one JSON file per key under the platform data
/// directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store under the platform data directory. `None` when no home
    /// directory can be determined; callers fall back to [`MemoryStore`].
    pub fn new() -> Option<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")?;
        Some(Self {
            dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Store under an explicit directory, for tests.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PreferenceStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| PersistError::Read {
                key: key.to_string(),
                source,
            })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Write {
            key: key.to_string(),
            source,
        })?;

        fs::write(self.path_for(key), value).map_err(|source| PersistError::Write {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory store for tests and for sessions without a usable data
/// directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FavoriteCity;

    #[test]
    fn load_returns_default_when_missing() {
        let store = MemoryStore::new();
        assert!(!load(&store, KEY_DARK_MODE, false));
        assert_eq!(load(&store, KEY_FAVORITES, Vec::<FavoriteCity>::new()), vec![]);
    }

    #[test]
    fn load_returns_default_on_malformed_json() {
        let store = MemoryStore::new();
        store
            .write(KEY_DARK_MODE, "{not json")
            .expect("memory write");

        assert!(load(&store, KEY_DARK_MODE, true));
        assert!(!load(&store, KEY_DARK_MODE, false));
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        let favorites = vec![FavoriteCity {
            id: 2643743,
            name: "London".to_string(),
            country: "GB".to_string(),
        }];

        save(&store, KEY_FAVORITES, &favorites);
        assert_eq!(
            load(&store, KEY_FAVORITES, Vec::<FavoriteCity>::new()),
            favorites
        );
    }

    #[test]
    fn file_store_round_trips_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::with_dir(dir.path().to_path_buf());

        save(&store, KEY_DARK_MODE, &true);
        assert!(load(&store, KEY_DARK_MODE, false));

        // A second store over the same directory sees the value.
        let reopened = FileStore::with_dir(dir.path().to_path_buf());
        assert!(load(&reopened, KEY_DARK_MODE, false));
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::with_dir(dir.path().to_path_buf());
        fs::create_dir_all(dir.path()).expect("dir");
        fs::write(dir.path().join("favorites.json"), "][").expect("write");

        let favorites: Vec<FavoriteCity> = load(&store, KEY_FAVORITES, Vec::new());
        assert!(favorites.is_empty());
    }
}
