//! Durable key-value storage for cart snapshots.

use std::collections::HashMap;

/// Key the cart snapshot is stored under.
pub const CART_STORAGE_KEY: &str = "artifi-cart";

/// Errors reported by a [`CartStorage`] backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The value could not be encoded for storage.
    #[error("could not encode value: {0}")]
    Encode(String),
}

/// A string key-value store that survives page reloads.
///
/// Writes are fire-and-forget from the cart's point of view: a failed `set`
/// is reported as a warning and never undoes the in-memory mutation.
pub trait CartStorage {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

/// In-memory storage, used for tests and for sessions without a backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a value, e.g. a snapshot from a previous visit.
    #[must_use]
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_owned(), value.into());
        Self { entries }
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl CartStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}
