//! Server-side state table.

use crate::error::ServerResult;
use beliefmap_storage::{FileBackend, InMemoryBackend, KvBackend};
use beliefmap_sync_protocol::now_millis;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// One row of the state table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRow {
    /// Stored value as JSON text.
    pub value: String,
    /// Server receipt time of the last write, in milliseconds.
    pub updated_at: i64,
}

/// Keyed rows of `{value, updated_at}` on top of a [`KvBackend`].
///
/// # Invariants
///
/// - Every upsert moves `updated_at` strictly forward for its key
/// - Deleting a missing key succeeds
pub struct StateTable {
    backend: Arc<dyn KvBackend>,
    write_lock: Mutex<()>,
}

impl StateTable {
    /// Creates a table over `backend`.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a volatile in-memory table.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    /// Opens a durable table in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its data is corrupted.
    pub fn open(dir: &Path) -> ServerResult<Self> {
        let backend = FileBackend::open(dir)?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// Returns the row for `key`.
    ///
    /// A row that no longer parses is logged and treated as absent.
    pub fn get(&self, key: &str) -> ServerResult<Option<StateRow>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(row) => Ok(Some(row)),
            Err(e) => {
                warn!(key, error = %e, "dropping unreadable state row");
                Ok(None)
            }
        }
    }

    /// Inserts or replaces the value for `key` and returns the new `updated_at`.
    pub fn upsert(&self, key: &str, value: String) -> ServerResult<i64> {
        let _guard = self.write_lock.lock();
        let previous = self.get(key)?.map(|row| row.updated_at).unwrap_or(0);
        let updated_at = now_millis().max(previous.saturating_add(1));

        let row = serde_json::to_string(&StateRow { value, updated_at })
            .map_err(beliefmap_storage::StorageError::from)?;
        self.backend.put(key, &row)?;
        Ok(updated_at)
    }

    /// Removes `key`.
    pub fn delete(&self, key: &str) -> ServerResult<()> {
        let _guard = self.write_lock.lock();
        self.backend.remove(key)?;
        Ok(())
    }

    /// Returns the number of rows.
    pub fn len(&self) -> ServerResult<usize> {
        Ok(self.backend.keys()?.len())
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> ServerResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl std::fmt::Debug for StateTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTable").finish_non_exhaustive()
    }
}
