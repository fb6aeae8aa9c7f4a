//! Local key-value persistence.
//!
//! The storefront keeps exactly three records on the device: the cart (a JSON
//! array of test ids) and the session token and user id. Values are stored as
//! strings; writes replace the whole record.

mod file;
mod memory;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key of the cart record.
pub const CART_KEY: &str = "cart";
/// Key of the session token.
pub const USER_TOKEN_KEY: &str = "userToken";
/// Key of the logged-in user id.
pub const USER_ID_KEY: &str = "userId";

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// One change in a [`KeyValueStore::write_batch`]. `None` deletes the key.
pub type Write<'a> = (&'a str, Option<&'a str>);

/// Closure run by [`KeyValueStore::update`]: current value in, new value out.
pub type Update<'a> = dyn FnMut(Option<&str>) -> Result<Option<String>, StorageError> + 'a;

/// A string-to-string store shared by the cart and session.
///
/// Implementations use interior mutability so a single instance can sit
/// behind an `Arc` and be written from anywhere. Every write goes through
/// one lock, and a failed write leaves the store as it was.
pub trait KeyValueStore: Send + Sync {
    /// Read a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Apply several writes as one step: either all of them land or none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn write_batch(&self, writes: &[Write<'_>]) -> Result<(), StorageError>;

    /// Read-modify-write one record while holding the store lock.
    ///
    /// `change` is called exactly once with the current value. Returning
    /// `None` deletes the record; an error aborts without writing.
    ///
    /// # Errors
    ///
    /// Returns the error from `change`, or an error if the backing store
    /// cannot be written.
    fn update(&self, key: &str, change: &mut Update<'_>) -> Result<(), StorageError>;

    /// Write a record, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_batch(&[(key, Some(value))])
    }

    /// Delete a record. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.write_batch(&[(key, None)])
    }
}

/// Apply `writes` to an in-memory record map.
fn apply(records: &mut BTreeMap<String, String>, writes: &[Write<'_>]) {
    for (key, value) in writes {
        match value {
            Some(value) => {
                records.insert((*key).to_string(), (*value).to_string());
            }
            None => {
                records.remove(*key);
            }
        }
    }
}

/// Read a JSON-encoded record.
///
/// # Errors
///
/// Returns an error if the store fails or the record does not decode as `T`.
pub fn get_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Read-modify-write a JSON-encoded record under the store lock.
///
/// A missing record starts as `T::default()`.
///
/// # Errors
///
/// Returns an error if the record does not decode as `T` or the write fails.
pub fn update_json<T, F>(
    store: &dyn KeyValueStore,
    key: &str,
    mut change: F,
) -> Result<(), StorageError>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnMut(&mut T),
{
    store.update(key, &mut |raw| {
        let mut value: T = match raw {
            Some(raw) => serde_json::from_str(raw)?,
            None => T::default(),
        };
        change(&mut value);
        Ok(Some(serde_json::to_string(&value)?))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_json_decodes_record() {
        let store = MemoryStore::new();
        store.set(CART_KEY, r#"["t1","t2"]"#).unwrap();

        let ids: Vec<String> = get_json(&store, CART_KEY).unwrap().unwrap();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_update_json_starts_from_default() {
        let store = MemoryStore::new();
        update_json(&store, CART_KEY, |ids: &mut Vec<String>| {
            ids.push("t1".to_string());
        })
        .unwrap();
        update_json(&store, CART_KEY, |ids: &mut Vec<String>| {
            ids.push("t2".to_string());
        })
        .unwrap();

        assert_eq!(store.get(CART_KEY).unwrap().unwrap(), r#"["t1","t2"]"#);
    }

    #[test]
    fn test_update_json_corrupt_record_is_not_overwritten() {
        let store = MemoryStore::new();
        store.set(CART_KEY, "not json").unwrap();

        let result = update_json(&store, CART_KEY, |ids: &mut Vec<String>| ids.clear());
        assert!(matches!(result, Err(StorageError::Json(_))));
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some("not json"));
    }

    #[test]
    fn test_write_batch_deletes_with_none() {
        let store = MemoryStore::new();
        store.set(USER_TOKEN_KEY, "t1").unwrap();
        store.set(USER_ID_KEY, "u1").unwrap();

        store
            .write_batch(&[(USER_TOKEN_KEY, None), (USER_ID_KEY, None)])
            .unwrap();
        assert!(store.get(USER_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(USER_ID_KEY).unwrap().is_none());
    }

    #[test]
    fn test_get_json_missing() {
        let store = MemoryStore::new();
        let ids: Option<Vec<String>> = get_json(&store, CART_KEY).unwrap();
        assert!(ids.is_none());
    }

    #[test]
    fn test_get_json_corrupt_record() {
        let store = MemoryStore::new();
        store.set(CART_KEY, "not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = get_json(&store, CART_KEY);
        assert!(matches!(result, Err(StorageError::Json(_))));
    }
}
