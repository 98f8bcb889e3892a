//! Storage implementations for the session token slot.
//!
//! The token occupies a single key; everything else about the backing store
//! is the host's business, so the client only sees the [`SessionStorage`]
//! trait. Browser local storage lives behind the `wasm-js` feature;
//! [`MemoryStorage`] covers tests, server-side rendering, and other hosts
//! without a browser.

use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

#[cfg(feature = "wasm-js")]
pub mod wasm_js;
#[cfg(feature = "wasm-js")]
pub use wasm_js::LocalStorage;

/// The storage key under which the session token is persisted.
pub const KEY_SESSION_TOKEN: &str = "token";

/// The error type for storage backends.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The backing store does not exist in this environment.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The backing store rejected the operation.
    #[error("storage access failed: {0}")]
    Access(String),
}

/// Trait for persisting the session token.
pub trait SessionStorage: Send {
    /// Retrieves a stored value by key. `Ok(None)` when the key is absent.
    fn get(&mut self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores a value under `key`, overwriting any prior value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the value stored under `key`, if any.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`SessionStorage`].
///
/// Clones share one underlying map, so a test can hand a clone to the client
/// and inspect the original afterwards.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage(Arc<Mutex<HashMap<String, String>>>);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&mut self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.0.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.0.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        storage.set("test", "value").unwrap();
        assert_eq!(storage.get("test").unwrap().as_deref(), Some("value"));
        storage.remove("test").unwrap();
        assert_eq!(storage.get("test").unwrap(), None);
    }

    #[test]
    fn memory_storage_clones_share_state() {
        let mut storage = MemoryStorage::new();
        let mut probe = storage.clone();
        storage.set(KEY_SESSION_TOKEN, "abc").unwrap();
        assert_eq!(probe.get(KEY_SESSION_TOKEN).unwrap().as_deref(), Some("abc"));
    }
}
