//! Durable client-side key-value storage.
//!
//! Values are JSON text under fixed keys. Reads and writes are synchronous.

use std::{fmt::Debug, io};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Key holding the signed-in user.
pub const USER_KEY: &str = "user";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend IO failure.
    #[error("storage IO error for key {0:?}: {1}")]
    Io(String, #[source] io::Error),

    /// Stored text could not be decoded, or a value could not be encoded.
    #[error("malformed value for key {0:?}: {1}")]
    Serde(String, #[source] serde_json::Error),

    /// Key is not a plain identifier.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// A durable string key-value slot store.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Read the text under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the text under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode the JSON value under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the read fails or the text does not decode.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|text| serde_json::from_str(&text).map_err(|err| StorageError::Serde(key.to_string(), err)))
        .transpose()
}

/// Encode `value` as JSON and write it under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if encoding or the write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let text =
        serde_json::to_string(value).map_err(|err| StorageError::Serde(key.to_string(), err))?;

    store.set(key, &text)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn json_helpers_round_trip_through_store() -> TestResult {
        let store = MemoryStore::new();

        save_json(&store, "numbers", &[1, 2, 3])?;

        let numbers: Option<Vec<u8>> = load_json(&store, "numbers")?;

        assert_eq!(numbers, Some(vec![1, 2, 3]));

        Ok(())
    }

    #[test]
    fn load_json_missing_key_is_none() -> TestResult {
        let value: Option<String> = load_json(&MemoryStore::new(), "nothing")?;

        assert!(value.is_none());

        Ok(())
    }

    #[test]
    fn load_json_reports_malformed_text() -> TestResult {
        let store = MemoryStore::new();
        store.set("cart", "{not json")?;

        let result: Result<Option<Vec<u8>>, _> = load_json(&store, "cart");

        assert!(matches!(result, Err(StorageError::Serde(key, _)) if key == "cart"));

        Ok(())
    }
}
