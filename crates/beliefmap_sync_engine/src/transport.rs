//! Remote state service abstraction.

use crate::error::{Ack, SyncError, SyncResult};
use async_trait::async_trait;
use beliefmap_sync_protocol::{now_millis, RemoteRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Client side of the remote key-value state service.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-memory mock for testing, etc.).
#[async_trait]
pub trait RemoteState: Send + Sync {
    /// Fetches the server's record for `key`. `Ok(None)` means the key is absent.
    async fn fetch(&self, key: &str) -> SyncResult<Option<RemoteRecord>>;

    /// Upserts `value` under `key`.
    async fn send(&self, key: &str, value: &str) -> SyncResult<Ack>;

    /// Deletes `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> SyncResult<Ack>;
}

/// Runs a remote call with an upper bound on its duration.
///
/// Elapsed calls become [`SyncError::Timeout`].
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> SyncResult<T>
where
    F: std::future::Future<Output = SyncResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| SyncError::Timeout)?
}

/// An in-memory remote for testing.
///
/// Behaves like the state server: every successful send stamps the row with
/// a strictly increasing `updated_at`. Can be switched offline and slowed
/// down to exercise the failure and timeout paths.
#[derive(Debug, Default)]
pub struct MockRemote {
    rows: Mutex<HashMap<String, RemoteRecord>>,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    sends: AtomicUsize,
    deletes: AtomicUsize,
}

impl MockRemote {
    /// Creates a new, online, empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the remote online or offline.
    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    /// Returns true if the remote is reachable.
    pub fn is_online(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Seeds a row with an explicit `updated_at`.
    pub fn insert(&self, key: impl Into<String>, data: impl Into<String>, updated_at: i64) {
        self.rows.lock().insert(
            key.into(),
            RemoteRecord {
                data: data.into(),
                updated_at,
            },
        );
    }

    /// Returns the stored record for `key`, bypassing connectivity.
    pub fn record(&self, key: &str) -> Option<RemoteRecord> {
        self.rows.lock().get(key).cloned()
    }

    /// Number of fetch calls made.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of send calls made.
    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Number of delete calls made.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    async fn roundtrip(&self) -> SyncResult<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.is_online() {
            Ok(())
        } else {
            Err(SyncError::transport_retryable("mock remote is offline"))
        }
    }
}

#[async_trait]
impl RemoteState for MockRemote {
    async fn fetch(&self, key: &str) -> SyncResult<Option<RemoteRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        Ok(self.record(key))
    }

    async fn send(&self, key: &str, value: &str) -> SyncResult<Ack> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;

        let mut rows = self.rows.lock();
        let previous = rows.get(key).map(|r| r.updated_at).unwrap_or(0);
        rows.insert(
            key.to_string(),
            RemoteRecord {
                data: value.to_string(),
                updated_at: now_millis().max(previous + 1),
            },
        );
        Ok(Ack)
    }

    async fn delete(&self, key: &str) -> SyncResult<Ack> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.roundtrip().await?;
        self.rows.lock().remove(key);
        Ok(Ack)
    }
}
