//! Main state server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{delete_state, get_state, health, put_state, HandlerContext, RequestHandler};
use crate::store::StateTable;
use axum::routing::get;
use axum::Router;
use beliefmap_sync_protocol::{HEALTH_PATH, STATE_PATH};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// The state server.
///
/// Serves `GET`, `POST` and `DELETE` on `/api/state` plus an
/// unauthenticated `/api/health` check.
///
/// # Example
///
/// ```no_run
/// use beliefmap_sync_server::{ServerConfig, StateServer};
///
/// # async fn run() -> beliefmap_sync_server::ServerResult<()> {
/// let config = ServerConfig::default().with_secret("s3cret");
/// let server = StateServer::new(config)?;
/// server.bind_and_serve().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StateServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl StateServer {
    /// Creates a new state server.
    ///
    /// Opens the durable table under `config.data_dir` if set, otherwise
    /// keeps state in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let table = match &config.data_dir {
            Some(dir) => StateTable::open(dir)?,
            None => StateTable::in_memory(),
        };
        Ok(Self::with_table(config, Arc::new(table)))
    }

    /// Creates a state server with an existing table.
    pub fn with_table(config: ServerConfig, table: Arc<StateTable>) -> Self {
        if config.api_secret.is_none() {
            warn!("no API secret configured, every state request will be rejected");
        }
        let context = Arc::new(HandlerContext::new(config, table));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Returns the request handler.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Returns the state table.
    pub fn table(&self) -> &Arc<StateTable> {
        &self.context.table
    }

    /// Builds the HTTP router.
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                STATE_PATH,
                get(get_state).post(put_state).delete(delete_state),
            )
            .route(HEALTH_PATH, get(health))
            .with_state(self.handler.clone())
    }

    /// Serves requests on an already-bound listener until the task is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails.
    pub async fn serve(self, listener: TcpListener) -> ServerResult<()> {
        let addr = listener.local_addr()?;
        info!(%addr, "state server listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Binds `config.bind_addr` and serves requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind_and_serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Returns the configured bind address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.context.config.bind_addr
    }
}
