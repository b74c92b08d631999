//! In-memory storage backend for testing.

use crate::backend::KvBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory key-value backend.
///
/// This backend stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral clients that don't need persistence
///
/// Writes can be switched to fail with [`InMemoryBackend::set_fail_writes`],
/// which is how tests simulate an exhausted storage quota.
///
/// # Example
///
/// ```rust
/// use beliefmap_storage::{InMemoryBackend, KvBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.put("theme", "{\"dark\":true}").unwrap();
/// assert_eq!(backend.len().unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<BTreeMap<String, String>>,
    fail_writes: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with the given entries.
    ///
    /// Useful for testing recovery scenarios.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: RwLock::new(data),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent `put`/`remove` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of all entries.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.data.read().clone()
    }

    /// Clears all data from the backend.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected("in-memory backend is read-only".into()));
        }
        Ok(())
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.data.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.data.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.is_empty().unwrap());
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn memory_put_then_get() {
        let backend = InMemoryBackend::new();
        backend.put("a", "1").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(backend.get("b").unwrap(), None);
    }

    #[test]
    fn memory_put_replaces() {
        let backend = InMemoryBackend::new();
        backend.put("a", "1").unwrap();
        backend.put("a", "2").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn memory_remove_missing_is_ok() {
        let backend = InMemoryBackend::new();
        assert!(backend.remove("nope").is_ok());
    }

    #[test]
    fn memory_keys_are_sorted() {
        let backend = InMemoryBackend::with_entries([("b", "2"), ("a", "1"), ("c", "3")]);
        assert_eq!(backend.keys().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn memory_fail_writes() {
        let backend = InMemoryBackend::with_entries([("a", "1")]);
        backend.set_fail_writes(true);

        assert!(matches!(backend.put("a", "2"), Err(StorageError::WriteRejected(_))));
        assert!(backend.remove("a").is_err());
        // Reads still work and the old value is intact
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));

        backend.set_fail_writes(false);
        backend.put("a", "2").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn memory_clear() {
        let backend = InMemoryBackend::with_entries([("a", "1")]);
        backend.clear();
        assert!(backend.is_empty().unwrap());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Put(String, String),
            Remove(String),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            let key = "[a-d]";
            prop_oneof![
                (key, "[a-z0-9]{0,8}").prop_map(|(k, v)| Op::Put(k, v)),
                key.prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn matches_btreemap_model(ops in proptest::collection::vec(op_strategy(), 0..64)) {
                let backend = InMemoryBackend::new();
                let mut model = BTreeMap::new();

                for op in ops {
                    match op {
                        Op::Put(k, v) => {
                            backend.put(&k, &v).unwrap();
                            model.insert(k, v);
                        }
                        Op::Remove(k) => {
                            backend.remove(&k).unwrap();
                            model.remove(&k);
                        }
                    }
                }

                prop_assert_eq!(backend.snapshot(), model);
            }
        }
    }
}
