//! Serve command implementation.

use beliefmap_sync_server::{ServerConfig, StateServer};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Builds the server configuration from the environment and the flags.
pub fn config(bind: Option<SocketAddr>, secret: Option<String>, data_dir: Option<PathBuf>) -> ServerConfig {
    let mut config = ServerConfig::from_env();
    if let Some(bind) = bind {
        config = config.with_bind_addr(bind);
    }
    if let Some(secret) = secret {
        config = config.with_secret(secret);
    }
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    config
}

/// Runs the serve command until interrupted.
pub async fn run(
    bind: Option<SocketAddr>,
    secret: Option<String>,
    data_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config(bind, secret, data_dir);
    tracing::info!(
        bind = %config.bind_addr,
        durable = config.data_dir.is_some(),
        "starting state server"
    );

    let server = StateServer::new(config)?;
    tokio::select! {
        result = server.bind_and_serve() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
