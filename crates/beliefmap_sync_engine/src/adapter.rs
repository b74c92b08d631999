//! Hybrid offline-first storage adapter.
//!
//! Implements the `getItem`/`setItem`/`removeItem` contract the application's
//! persistence layer expects:
//!
//! - every call completes its local half synchronously and returns at once
//! - the remote half runs as a background task whose outcome is reported
//!   through a [`SyncTask`], never as an error to the caller
//! - remote data only overrides local state through the rehydration path

use crate::error::{Ack, SyncError, SyncResult};
use crate::local::LocalStore;
use crate::queue::PendingQueue;
use crate::rehydrate::RehydrationRegistry;
use crate::task::SyncTask;
use crate::transport::{bounded, RemoteState};
use beliefmap_sync_protocol::{last_modified, resolve, Resolution};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// What the background freshness check of [`HybridStorage::get_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetch failed or the server has no value for the key.
    Skipped,
    /// The server value is not newer than the local one.
    UpToDate,
    /// The server value replaced the local one.
    Rehydrated {
        /// Whether a rehydration callback was registered and invoked.
        notified: bool,
    },
}

/// Result of [`HybridStorage::get_item`].
#[derive(Debug)]
pub struct ItemRead {
    /// The local value at the time of the call.
    pub value: Option<String>,
    /// Background freshness check against the server.
    pub refresh: SyncTask<RefreshOutcome>,
}

/// Storage adapter combining the local durable store with the remote service.
#[derive(Clone)]
pub struct HybridStorage {
    local: LocalStore,
    queue: PendingQueue,
    remote: Arc<dyn RemoteState>,
    registry: RehydrationRegistry,
    request_timeout: Duration,
    runtime: Handle,
}

impl HybridStorage {
    /// Creates a new adapter.
    ///
    /// Background tasks are spawned on the Tokio runtime that is current
    /// when this is called.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRuntime`] when called outside a Tokio runtime.
    pub fn new(
        local: LocalStore,
        queue: PendingQueue,
        remote: Arc<dyn RemoteState>,
        registry: RehydrationRegistry,
        request_timeout: Duration,
    ) -> SyncResult<Self> {
        let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        Ok(Self {
            local,
            queue,
            remote,
            registry,
            request_timeout,
            runtime,
        })
    }

    /// Returns the local durable store.
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Returns the pending-write queue.
    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// Returns the rehydration registry.
    pub fn registry(&self) -> &RehydrationRegistry {
        &self.registry
    }

    /// Returns the local value for `name` and starts a background freshness check.
    ///
    /// The returned value never waits on the network. If the server holds a
    /// value whose `updated_at` is strictly greater than the `_lastModified`
    /// embedded in the local value, the background task overwrites the local
    /// entry and fires the rehydration callback for `name`.
    pub fn get_item(&self, name: &str) -> ItemRead {
        let value = self.local.read(name);

        let this = self.clone();
        let name = name.to_string();
        let snapshot = value.clone();
        let refresh = self
            .runtime
            .spawn(async move { this.refresh(&name, snapshot.as_deref()).await });

        ItemRead {
            value,
            refresh: SyncTask::new(refresh),
        }
    }

    async fn refresh(&self, name: &str, local: Option<&str>) -> RefreshOutcome {
        let record = match bounded(self.request_timeout, self.remote.fetch(name)).await {
            Ok(Some(record)) => record,
            Ok(None) => return RefreshOutcome::Skipped,
            Err(e) => {
                debug!(name, error = %e, "remote fetch failed, keeping local value");
                return RefreshOutcome::Skipped;
            }
        };

        let local_ts = last_modified(local);
        match resolve(local_ts, record.updated_at) {
            Resolution::KeepLocal => RefreshOutcome::UpToDate,
            Resolution::TakeRemote => {
                debug!(
                    name,
                    local_ts,
                    remote_ts = record.updated_at,
                    "server value is newer, rehydrating"
                );
                self.local.write(name, &record.data);
                let notified = self.registry.notify(name);
                RefreshOutcome::Rehydrated { notified }
            }
        }
    }

    /// Writes `value` locally, then sends it to the server in the background.
    ///
    /// On success any queued entry for `name` is dropped; on failure
    /// `{name, value}` is queued for the scheduler to retry.
    pub fn set_item(&self, name: &str, value: &str) -> SyncTask<SyncResult<Ack>> {
        self.local.write(name, value);

        let this = self.clone();
        let name = name.to_string();
        let value = value.to_string();
        let task = self.runtime.spawn(async move {
            match bounded(this.request_timeout, this.remote.send(&name, &value)).await {
                Ok(ack) => {
                    this.queue.dequeue(&name);
                    Ok(ack)
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "remote write failed, queued for retry");
                    this.queue.enqueue(&name, &value);
                    Err(e)
                }
            }
        });

        SyncTask::new(task)
    }

    /// Deletes `name` locally and from the queue, then deletes it remotely.
    ///
    /// A failed remote delete is not retried.
    pub fn remove_item(&self, name: &str) -> SyncTask<SyncResult<Ack>> {
        self.local.delete(name);
        self.queue.dequeue(name);

        let remote = Arc::clone(&self.remote);
        let timeout = self.request_timeout;
        let name = name.to_string();
        let task = self.runtime.spawn(async move {
            let result = bounded(timeout, remote.delete(&name)).await;
            if let Err(e) = &result {
                debug!(name = %name, error = %e, "remote delete failed, ignoring");
            }
            result
        });

        SyncTask::new(task)
    }
}

impl std::fmt::Debug for HybridStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridStorage")
            .field("request_timeout", &self.request_timeout)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
