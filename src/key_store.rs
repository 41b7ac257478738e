use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Storage entry holding the provider API key.
pub const CREDENTIAL_KEY: &str = "openrouterApiKey";

/// Persistent string map. One entry per key, surviving restarts for
/// file-backed implementations.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// JSON object on disk. Every call re-reads the file so edits made by
/// another instance are picked up.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| Error::Store(format!("{}: {}", self.path.display(), e)))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        FileStore::new(&path).set(CREDENTIAL_KEY, "xyz").unwrap();
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("xyz"));

        reopened.remove(CREDENTIAL_KEY).unwrap();
        assert_eq!(FileStore::new(&path).get(CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_keeps_unrelated_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));
        store.set("theme", "dark").unwrap();
        store.set(CREDENTIAL_KEY, "xyz").unwrap();
        store.remove(CREDENTIAL_KEY).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::new(&path).get(CREDENTIAL_KEY), Err(Error::Store(_))));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::with_entry(CREDENTIAL_KEY, "abc");
        assert_eq!(store.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("abc"));
        store.remove(CREDENTIAL_KEY).unwrap();
        assert!(store.get(CREDENTIAL_KEY).unwrap().is_none());
    }
}
