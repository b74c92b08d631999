//! Local durable store.

use beliefmap_storage::KvBackend;
use std::sync::Arc;
use tracing::warn;

/// Synchronous key-to-string store that never fails observably.
///
/// Wraps a [`KvBackend`]. Backend errors are logged and swallowed: a failed
/// read is an absent value and a failed write is a no-op, so durability
/// problems never block the caller.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KvBackend>,
}

impl LocalStore {
    /// Creates a store over `backend`.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    /// Reads the value for `key`.
    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "local read failed, treating as absent");
                None
            }
        }
    }

    /// Writes `value` under `key`.
    pub fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.put(key, value) {
            warn!(key, error = %e, "local write failed, dropping");
        }
    }

    /// Deletes `key`.
    pub fn delete(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!(key, error = %e, "local delete failed");
        }
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beliefmap_storage::InMemoryBackend;

    #[test]
    fn read_write_delete() {
        let store = LocalStore::new(Arc::new(InMemoryBackend::new()));
        assert_eq!(store.read("k"), None);

        store.write("k", "v");
        assert_eq!(store.read("k").as_deref(), Some("v"));

        store.delete("k");
        assert_eq!(store.read("k"), None);
    }

    #[test]
    fn failures_are_swallowed() {
        let backend = Arc::new(InMemoryBackend::with_entries([("k", "old")]));
        let store = LocalStore::new(backend.clone());

        backend.set_fail_writes(true);
        store.write("k", "new");
        store.delete("k");

        assert_eq!(store.read("k").as_deref(), Some("old"));
    }
}
