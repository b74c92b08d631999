//! # beliefmap Sync Protocol
//!
//! Wire types and persisted layout for beliefmap state sync.
//!
//! This crate provides:
//! - HTTP message bodies for the `/api/state` endpoint
//! - `RemoteRecord` for values fetched from the server
//! - `QueueItem` and the JSON layout of the pending-write queue
//! - Envelope helpers for the embedded `_lastModified` timestamp
//! - The last-write-wins freshness rule
//! - The `Credential` model attached to every request
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod conflict;
mod credential;
mod envelope;
mod error;
mod messages;
mod queue;

pub use conflict::{resolve, Resolution};
pub use credential::{Credential, AUTH_COOKIE};
pub use envelope::{last_modified, stamp, LAST_MODIFIED_FIELD};
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{
    AckResponse, ErrorResponse, HealthResponse, KeyQuery, PutStateRequest, RemoteRecord,
    StateResponse, HEALTH_PATH, STATE_PATH,
};
pub use queue::{decode_queue, encode_queue, QueueItem, SYNC_QUEUE_KEY};

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
