use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Browser-style local storage: string values under string keys.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// ===============================
/// JSON file backed storage
/// ===============================
///
/// The whole file is rewritten on every mutation; entries are few and small.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl FileStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            if raw.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&raw)
                    .with_context(|| format!("{} is not a JSON object", path.display()))?
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let body = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, body)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("local storage lock poisoned"))?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.flush(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("local storage lock poisoned"))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// In-memory storage, used where nothing should outlive the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("local storage lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("local storage lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_survives_reopen() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("nested").join("local_storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set_item("theme", "light").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item("theme").as_deref(), Some("light"));
    }

    #[test]
    fn removed_keys_are_gone_after_reopen() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("local_storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set_item("auth", "{}").unwrap();
        storage.remove_item("auth").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert!(reopened.get_item("auth").is_none());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("local_storage.json");
        fs::write(&path, "not json").unwrap();

        assert!(FileStorage::open(&path).is_err());
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::default();
        assert!(storage.get_item("auth").is_none());
        storage.set_item("auth", "x").unwrap();
        assert_eq!(storage.get_item("auth").as_deref(), Some("x"));
        storage.remove_item("auth").unwrap();
        assert!(storage.get_item("auth").is_none());
    }
}
