use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{KeyValueStore, StorageError, Update, Write, apply};

/// Volatile store, for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.records.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write_batch(&self, writes: &[Write<'_>]) -> Result<(), StorageError> {
        apply(&mut *self.lock()?, writes);
        Ok(())
    }

    fn update(&self, key: &str, change: &mut Update<'_>) -> Result<(), StorageError> {
        let mut records = self.lock()?;
        let value = change(records.get(key).map(String::as_str))?;
        apply(&mut records, &[(key, value.as_deref())]);
        Ok(())
    }
}
