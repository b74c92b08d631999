//! Client facade wiring storage, queue, remote and scheduler together.

use crate::adapter::HybridStorage;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::http::HttpRemote;
use crate::local::LocalStore;
use crate::queue::PendingQueue;
use crate::rehydrate::RehydrationRegistry;
use crate::scheduler::{SyncScheduler, SyncStatus};
use crate::transport::RemoteState;
use beliefmap_storage::KvBackend;
use std::sync::Arc;
use tracing::info;

/// One offline-first client session.
///
/// Owns a single [`PendingQueue`] shared by the storage adapter and the
/// scheduler, so every write path sees the same queue.
///
/// # Example
///
/// ```no_run
/// use beliefmap_storage::InMemoryBackend;
/// use beliefmap_sync_engine::{SyncClient, SyncConfig};
/// use std::sync::Arc;
///
/// # async fn run() -> beliefmap_sync_engine::SyncResult<()> {
/// let client = SyncClient::connect(Arc::new(InMemoryBackend::new()), SyncConfig::from_env())?;
/// client.registry().register("flow-storage", || println!("reload"));
/// client.start();
///
/// let _ = client.storage().set_item("theme", "{\"dark\":true}");
/// let read = client.storage().get_item("theme");
/// assert!(read.value.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SyncClient {
    storage: HybridStorage,
    scheduler: SyncScheduler,
    config: SyncConfig,
}

impl SyncClient {
    /// Creates a client that talks HTTP to `config.server_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRuntime`](crate::SyncError::NoRuntime) when
    /// called outside a Tokio runtime.
    pub fn connect(backend: Arc<dyn KvBackend>, config: SyncConfig) -> SyncResult<Self> {
        let remote = Arc::new(HttpRemote::from_config(&config));
        Self::with_remote(backend, config, remote)
    }

    /// Creates a client with an explicit remote implementation and an
    /// empty rehydration registry.
    pub fn with_remote(
        backend: Arc<dyn KvBackend>,
        config: SyncConfig,
        remote: Arc<dyn RemoteState>,
    ) -> SyncResult<Self> {
        Self::with_registry(backend, config, remote, RehydrationRegistry::new())
    }

    /// Creates a client around an application-owned rehydration registry.
    ///
    /// Callbacks already registered on `registry` fire whenever a newer
    /// server value replaces local state.
    pub fn with_registry(
        backend: Arc<dyn KvBackend>,
        config: SyncConfig,
        remote: Arc<dyn RemoteState>,
        registry: RehydrationRegistry,
    ) -> SyncResult<Self> {
        let local = LocalStore::new(backend);
        let queue = PendingQueue::new(local.clone());
        let storage = HybridStorage::new(
            local,
            queue.clone(),
            Arc::clone(&remote),
            registry,
            config.request_timeout,
        )?;
        let scheduler =
            SyncScheduler::new(queue, remote, config.request_timeout, config.poll_interval)?;

        info!(server = %config.server_url, "sync client ready");
        Ok(Self {
            storage,
            scheduler,
            config,
        })
    }

    /// Returns the storage adapter.
    pub fn storage(&self) -> &HybridStorage {
        &self.storage
    }

    /// Returns the scheduler.
    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    /// Returns the rehydration registry.
    pub fn registry(&self) -> &RehydrationRegistry {
        self.storage.registry()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Starts the scheduler if writes are pending.
    pub fn start(&self) {
        self.scheduler.start();
    }

    /// Returns the user-facing connectivity status.
    pub fn status(&self) -> SyncStatus {
        self.scheduler.status()
    }

    /// Stops background polling.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}
