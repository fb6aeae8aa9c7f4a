use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{KeyValueStore, StorageError, Update, Write, apply};

/// Store persisted as a single JSON object on disk.
///
/// The whole map is held in memory and every write rewrites the file through
/// a temp file and rename, so a crash never leaves a half-written store. A
/// write is applied to a copy of the map, and the copy replaces the live map
/// only once it is on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let records = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        debug!(path = %path.display(), records = records.len(), "Opened storage file");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.records.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Write `next` to disk, then make it the live map.
    fn commit(
        &self,
        records: &mut BTreeMap<String, String>,
        next: BTreeMap<String, String>,
    ) -> Result<(), StorageError> {
        if *records == next {
            return Ok(());
        }
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    fn persist(&self, records: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write_batch(&self, writes: &[Write<'_>]) -> Result<(), StorageError> {
        let mut records = self.lock()?;
        let mut next = records.clone();
        apply(&mut next, writes);
        self.commit(&mut records, next)
    }

    fn update(&self, key: &str, change: &mut Update<'_>) -> Result<(), StorageError> {
        let mut records = self.lock()?;
        let value = change(records.get(key).map(String::as_str))?;

        let mut next = records.clone();
        apply(&mut next, &[(key, value.as_deref())]);
        self.commit(&mut records, next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("storage.json")).unwrap();
        assert!(store.get("cart").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set("userToken", "t1").unwrap();
        store.set("userId", "u1").unwrap();
        store.remove("userId").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("userToken").unwrap().as_deref(), Some("t1"));
        assert!(reopened.get("userId").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StorageError::Json(_))));
    }

    /// A store whose directory has been replaced by a regular file, so every
    /// write fails.
    fn unwritable_store(dir: &Path) -> FileStore {
        let parent = dir.join("sub");
        let store = FileStore::open(parent.join("storage.json")).unwrap();
        fs::write(&parent, "not a directory").unwrap();
        store
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = unwritable_store(dir.path());

        assert!(store.set("userToken", "t1").is_err());
        assert!(store.get("userToken").unwrap().is_none());

        let result = store.write_batch(&[("userToken", Some("t1")), ("userId", Some("u1"))]);
        assert!(result.is_err());
        assert!(store.get("userToken").unwrap().is_none());
        assert!(store.get("userId").unwrap().is_none());
    }

    #[test]
    fn test_failed_update_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = unwritable_store(dir.path());

        let result = store.update("cart", &mut |_| Ok(Some("[\"t1\"]".to_string())));
        assert!(result.is_err());
        assert!(store.get("cart").unwrap().is_none());
    }

    #[test]
    fn test_batch_lands_together() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set("userToken", "old").unwrap();
        store
            .write_batch(&[("userToken", Some("t1")), ("userId", Some("u1"))])
            .unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("userToken").unwrap().as_deref(), Some("t1"));
        assert_eq!(reopened.get("userId").unwrap().as_deref(), Some("u1"));
    }
}
