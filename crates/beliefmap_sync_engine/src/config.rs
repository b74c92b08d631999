//! Configuration for the sync engine.

use beliefmap_sync_protocol::Credential;
use std::time::Duration;

/// Environment variable holding the server base URL.
pub const SERVER_URL_ENV: &str = "BELIEFMAP_SERVER_URL";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "BELIEFMAP_TOKEN";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Server base URL (e.g. `http://127.0.0.1:8080`).
    pub server_url: String,
    /// Credential attached to every request, if the session has one.
    pub credential: Option<Credential>,
    /// Upper bound on any single remote fetch, send or delete.
    pub request_timeout: Duration,
    /// Fixed cadence of the retry loop.
    pub poll_interval: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            credential: None,
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
        }
    }

    /// Loads the server URL and bearer token from the environment.
    ///
    /// Missing variables fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            config.server_url = url;
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                config.credential = Some(Credential::Bearer(token));
            }
        }
        config
    }

    /// Sets the credential.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the retry loop interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8080")
    }
}
