//! CLI command implementations.

pub mod item;
pub mod serve;
pub mod status;
pub mod sync;

use beliefmap_storage::FileBackend;
use beliefmap_sync_engine::{SyncClient, SyncConfig};
use beliefmap_sync_protocol::Credential;
use std::path::Path;
use std::sync::Arc;

/// Server connection flags shared by the client commands.
#[derive(Debug, Default)]
pub struct RemoteArgs {
    /// Server URL override.
    pub server: Option<String>,
    /// Token override.
    pub token: Option<String>,
}

impl RemoteArgs {
    /// Builds the sync configuration: flags first, then the environment.
    pub fn config(&self) -> SyncConfig {
        let mut config = SyncConfig::from_env();
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(token) = &self.token {
            config = config.with_credential(Credential::Bearer(token.clone()));
        }
        config
    }
}

/// Opens the local store at `path` and connects a client to the server.
///
/// A damaged store file is moved aside and the store starts empty.
pub fn open_client(path: &Path, remote: &RemoteArgs) -> Result<SyncClient, Box<dyn std::error::Error>> {
    let backend = FileBackend::open_or_reset(path)?;
    let client = SyncClient::connect(Arc::new(backend), remote.config())?;
    Ok(client)
}
