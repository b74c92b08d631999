//! Storage backend trait definition.

use crate::error::StorageResult;

/// A key-value storage backend.
///
/// Backends are **opaque string stores**. Values are stored and returned
/// verbatim; the sync engine and the state server own all interpretation
/// of what a value contains.
///
/// # Invariants
///
/// - `get` returns exactly the value last written by `put` for that key
/// - `put` on an existing key replaces the value
/// - `remove` of a missing key succeeds
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait KvBackend: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read or is corrupted.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// After this returns successfully the value survives process restarts
    /// (for persistent backends).
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be made durable.
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be made durable.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Returns all keys currently stored, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Returns the number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn len(&self) -> StorageResult<usize> {
        Ok(self.keys()?.len())
    }

    /// Returns true if no keys are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
