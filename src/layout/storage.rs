//! Key/value stores holding the persisted layout.
//!
//! File stores live at `<state dir>/par-mux/<session>.layout.json` and hold a
//! flat JSON object of string keys to string values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use par_mux_config::Config;
use thiserror::Error;

/// Errors from layout storage
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed layout: {0}")]
    Malformed(String),
}

/// String key/value store surviving a restart
pub trait LayoutStore {
    fn get(&self, key: &str) -> Result<Option<String>, LayoutError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), LayoutError>;
    fn remove(&mut self, key: &str) -> Result<(), LayoutError>;
}

/// In-process store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LayoutError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LayoutError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), LayoutError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file store, one file per multiplexer session name
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `session` under the state directory
    pub fn for_session(session: &str) -> Self {
        Self::new(Self::session_path(session))
    }

    pub fn session_path(session: &str) -> PathBuf {
        Config::state_dir().join(format!("{session}.layout.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, LayoutError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), LayoutError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map)?;

        // Write to a temp file then rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LayoutStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LayoutError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LayoutError> {
        // An unreadable file is replaced rather than blocking every save
        let mut map = self.read_map().unwrap_or_else(|err| {
            log::warn!("Discarding unreadable layout store {:?}: {}", self.path, err);
            BTreeMap::new()
        });
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), LayoutError> {
        let mut map = self.read_map().unwrap_or_default();
        map.remove(key);
        if !map.is_empty() {
            self.write_map(&map)?;
        } else if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path().join("none.layout.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_parent_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("s.layout.json");
        let mut store = FileStore::new(&path);
        store.set("a", "1").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let temp = tempdir().unwrap();
        let mut store = FileStore::new(temp.path().join("s.layout.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_corrupt_file_is_error_on_read() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.layout.json");
        std::fs::write(&path, "{{{ not json").unwrap();
        let mut store = FileStore::new(&path);
        assert!(store.get("a").is_err());
        // Saving replaces the corrupt file
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }
}
