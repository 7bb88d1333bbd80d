//! services/client/src/adapters/storage.rs
//!
//! Adapters implementing the `Storage` port: a process-local map for tests and
//! embedding, and a JSON file for sessions that should survive restarts.

use academic_search_core::ports::{PortError, PortResult, Storage};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn poisoned<T>(_: std::sync::PoisonError<T>) -> PortError {
    PortError::Storage("storage lock poisoned".to_string())
}

//=========================================================================================
// MemoryStorage
//=========================================================================================

/// A `Storage` that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> PortResult<()> {
        self.entries.lock().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

//=========================================================================================
// FileStorage
//=========================================================================================

/// A `Storage` backed by a single JSON object on disk.
///
/// The file is read once on open; every mutation rewrites it through a
/// sibling `.tmp` file that is renamed into place.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens (or lazily creates) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> PortResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                PortError::Storage(format!("{} is not a valid store: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(PortError::Storage(e.to_string())),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PortError::Storage(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Storage(e.to_string()))?;

        // The store file is only ever replaced whole.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| PortError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| PortError::Storage(e.to_string()))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn clear(&self, key: &str) -> PortResult<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_clear() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.clear("k").unwrap();
        storage.clear("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("content_plus_token", "abc").unwrap();
        storage.set("tenant", "acme").unwrap();
        storage.clear("tenant").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("content_plus_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("tenant").unwrap(), None);
    }

    #[test]
    fn leftover_temp_file_does_not_break_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set("content_plus_token", "abc").unwrap();
        assert!(!path.with_extension("tmp").exists());
        drop(storage);

        // A write that died before the rename.
        fs::write(path.with_extension("tmp"), "{\"content_plus_tok").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("content_plus_token").unwrap().as_deref(), Some("abc"));
        reopened.set("tenant", "acme").unwrap();
        assert!(!path.with_extension("tmp").exists());

        let again = FileStorage::open(&path).unwrap();
        assert_eq!(again.get("tenant").unwrap().as_deref(), Some("acme"));
    }

    #[test]
    fn file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(FileStorage::open(&path), Err(PortError::Storage(_))));
    }
}
