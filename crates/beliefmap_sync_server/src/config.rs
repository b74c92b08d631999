//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable holding the listen address.
pub const BIND_ADDR_ENV: &str = "BIND_ADDR";
/// Environment variable holding the shared API secret.
pub const API_SECRET_ENV: &str = "API_SECRET";
/// Environment variable holding the data directory.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Configuration for the state server.
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Shared secret every request must present. `None` rejects all requests.
    pub api_secret: Option<String>,
    /// Directory of the durable state table. `None` keeps state in memory.
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            api_secret: None,
            data_dir: None,
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// Missing or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(addr) = std::env::var(BIND_ADDR_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.bind_addr = addr;
        }
        if let Ok(secret) = std::env::var(API_SECRET_ENV) {
            config = config.with_secret(secret);
        }
        if let Ok(path) = std::env::var(DATABASE_PATH_ENV) {
            config = config.with_data_dir(path);
        }
        config
    }

    /// Sets the shared API secret. An empty secret counts as none.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.api_secret = (!secret.is_empty()).then_some(secret);
        self
    }

    /// Persists state under `dir`.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.api_secret.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new("0.0.0.0:9000".parse().unwrap())
            .with_secret("s3cret")
            .with_data_dir("/var/lib/beliefmap");

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.api_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/beliefmap")));
    }

    #[test]
    fn empty_secret_is_none() {
        let config = ServerConfig::default().with_secret("");
        assert!(config.api_secret.is_none());
    }

    #[test]
    fn debug_hides_secret() {
        let config = ServerConfig::default().with_secret("s3cret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
    }
}
