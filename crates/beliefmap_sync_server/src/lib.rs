//! # Beliefmap Sync Server
//!
//! HTTP key-value state server for beliefmap clients.
//!
//! This crate provides:
//! - `GET`, `POST` and `DELETE` on `/api/state`
//! - A state table of `{value, updated_at}` rows, in memory or on disk
//! - Shared-secret authentication (bearer header or `auth-token` cookie)
//! - An unauthenticated health check at `/api/health`
//!
//! # Architecture
//!
//! The server is the meeting point for every client of one user. It stores
//! the last value written under each key together with the server time of
//! that write. Clients compare that time against the timestamp embedded in
//! their local copy and adopt the server value only when it is newer.
//!
//! Writes are last-PUT-wins. `updated_at` advances strictly on every write
//! to a key, even when the wall clock does not.
//!
//! # Authentication
//!
//! ```rust,ignore
//! use beliefmap_sync_server::{ServerConfig, StateServer};
//!
//! let config = ServerConfig::from_env().with_secret("my-shared-secret");
//! let server = StateServer::new(config)?;
//! server.bind_and_serve().await?;
//! ```
//!
//! Without a secret the server still starts but answers every state
//! request with `401`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
mod server;
mod store;

pub use auth::Authenticator;
pub use config::{ServerConfig, API_SECRET_ENV, BIND_ADDR_ENV, DATABASE_PATH_ENV};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use server::StateServer;
pub use store::{StateRow, StateTable};
