//! Pending-write queue.

use crate::local::LocalStore;
use beliefmap_sync_protocol::{decode_queue, encode_queue, now_millis, QueueItem, SYNC_QUEUE_KEY};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Ordered, deduplicated list of writes the server has not acknowledged.
///
/// The queue lives inside the [`LocalStore`] under [`SYNC_QUEUE_KEY`], so it
/// survives restarts. Each operation is a read-modify-write of that entry,
/// serialized by an internal lock.
///
/// # Invariants
///
/// - At most one item per `name`; a newer write replaces the queued value in place
/// - Unparsable persisted content reads as an empty queue
#[derive(Debug, Clone)]
pub struct PendingQueue {
    store: LocalStore,
    guard: Arc<Mutex<()>>,
}

impl PendingQueue {
    /// Creates a queue persisted in `store`.
    pub fn new(store: LocalStore) -> Self {
        Self {
            store,
            guard: Arc::new(Mutex::new(())),
        }
    }

    fn load(&self) -> Vec<QueueItem> {
        decode_queue(self.store.read(SYNC_QUEUE_KEY).as_deref())
    }

    fn save(&self, items: &[QueueItem]) {
        self.store.write(SYNC_QUEUE_KEY, &encode_queue(items));
    }

    /// Upserts `{name, value}`: replaces the existing entry for `name`, else appends.
    pub fn enqueue(&self, name: &str, value: &str) {
        let _guard = self.guard.lock();
        let mut items = self.load();
        let item = QueueItem::new(name, value, now_millis());

        match items.iter_mut().find(|i| i.name == name) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }

        debug!(name, pending = items.len(), "queued write for retry");
        self.save(&items);
    }

    /// Removes the entry for `name`. No-op if absent.
    pub fn dequeue(&self, name: &str) {
        let _guard = self.guard.lock();
        let mut items = self.load();
        let before = items.len();
        items.retain(|i| i.name != name);

        if items.len() != before {
            self.save(&items);
        }
    }

    /// Removes the entry for `name` only if it still holds `value`.
    ///
    /// Used after a retried send succeeds: if a newer write for the same key
    /// was queued while the send was in flight, that newer value stays.
    /// Returns true if an entry was removed.
    pub fn dequeue_sent(&self, name: &str, value: &str) -> bool {
        let _guard = self.guard.lock();
        let mut items = self.load();
        let before = items.len();
        items.retain(|i| !(i.name == name && i.value == value));

        let removed = items.len() != before;
        if removed {
            self.save(&items);
        }
        removed
    }

    /// Returns true iff the queue is non-empty.
    pub fn has_pending(&self) -> bool {
        !self.load().is_empty()
    }

    /// Returns the number of queued items.
    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_pending()
    }

    /// Returns the entry for `name`, if queued.
    pub fn get(&self, name: &str) -> Option<QueueItem> {
        self.load().into_iter().find(|i| i.name == name)
    }

    /// Returns a snapshot of the full queue in order. Does not clear it.
    pub fn drain(&self) -> Vec<QueueItem> {
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beliefmap_storage::{InMemoryBackend, KvBackend};

    fn queue() -> (PendingQueue, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        let queue = PendingQueue::new(LocalStore::new(backend.clone()));
        (queue, backend)
    }

    #[test]
    fn enqueue_dedups_by_name() {
        let (queue, _) = queue();
        queue.enqueue("k", "v1");
        queue.enqueue("k", "v2");

        let items = queue.drain();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "k");
        assert_eq!(items[0].value, "v2");
    }

    #[test]
    fn enqueue_keeps_insertion_order() {
        let (queue, _) = queue();
        queue.enqueue("a", "1");
        queue.enqueue("b", "2");
        queue.enqueue("a", "3");

        let names: Vec<_> = queue.drain().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(queue.get("a").unwrap().value, "3");
    }

    #[test]
    fn dequeue_removes_and_ignores_missing() {
        let (queue, _) = queue();
        queue.enqueue("a", "1");
        queue.dequeue("missing");
        assert_eq!(queue.len(), 1);

        queue.dequeue("a");
        assert!(!queue.has_pending());
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_does_not_clear() {
        let (queue, _) = queue();
        queue.enqueue("a", "1");
        assert_eq!(queue.drain().len(), 1);
        assert_eq!(queue.drain().len(), 1);
    }

    #[test]
    fn dequeue_sent_keeps_newer_value() {
        let (queue, _) = queue();
        queue.enqueue("a", "1");
        let sent = queue.drain().remove(0);

        queue.enqueue("a", "2");
        assert!(!queue.dequeue_sent(&sent.name, &sent.value));
        assert_eq!(queue.get("a").unwrap().value, "2");

        assert!(queue.dequeue_sent("a", "2"));
        assert!(queue.is_empty());
    }

    #[test]
    fn persisted_under_reserved_key() {
        let (queue, backend) = queue();
        queue.enqueue("theme", "{\"dark\":true}");

        let raw = backend.get(SYNC_QUEUE_KEY).unwrap().unwrap();
        assert!(raw.starts_with("[{\"name\":\"theme\""));

        // A fresh handle over the same store sees the same queue
        let reopened = PendingQueue::new(LocalStore::new(backend));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn corrupted_queue_reads_empty() {
        let (queue, backend) = queue();
        backend.put(SYNC_QUEUE_KEY, "{{{ nope").unwrap();
        assert!(!queue.has_pending());

        // And recovers on the next write
        queue.enqueue("a", "1");
        assert_eq!(queue.len(), 1);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #[test]
            fn never_two_entries_per_name(
                ops in proptest::collection::vec(("[a-c]", "[0-9]{1,3}", any::<bool>()), 0..40)
            ) {
                let (queue, _) = queue();
                for (name, value, remove) in ops {
                    if remove {
                        queue.dequeue(&name);
                    } else {
                        queue.enqueue(&name, &value);
                    }
                }

                let items = queue.drain();
                let names: HashSet<_> = items.iter().map(|i| i.name.clone()).collect();
                prop_assert_eq!(names.len(), items.len());
            }
        }
    }
}
