//! # Beliefmap Sync Engine
//!
//! Offline-first storage for beliefmap clients.
//!
//! This crate provides:
//! - Local durable store over any [`KvBackend`](beliefmap_storage::KvBackend)
//! - Persistent pending-write queue
//! - Remote state client (HTTP via `reqwest`, plus an in-memory mock)
//! - Hybrid storage adapter with last-write-wins rehydration
//! - Sync scheduler that retries queued writes
//!
//! ## Architecture
//!
//! Every write lands in local storage first and is then sent to the server
//! in the background. A failed send goes to the pending-write queue, which
//! the scheduler drains when connectivity returns and on a fixed cadence.
//!
//! Reads always return the local value immediately. A background check
//! compares it with the server copy; when the server copy is strictly newer
//! it replaces the local value and the key's rehydration callback fires.
//!
//! ## Key Invariants
//!
//! - The application never waits on the network
//! - Remote failures never surface as errors through the storage contract
//! - At most one queued write per key; the newest value wins
//! - Remote data only overrides local state through rehydration

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod client;
mod config;
mod error;
mod http;
mod local;
mod queue;
mod rehydrate;
mod scheduler;
mod task;
mod transport;

pub use adapter::{HybridStorage, ItemRead, RefreshOutcome};
pub use client::SyncClient;
pub use config::{SyncConfig, SERVER_URL_ENV, TOKEN_ENV};
pub use error::{Ack, SyncError, SyncResult};
pub use http::HttpRemote;
pub use local::LocalStore;
pub use queue::PendingQueue;
pub use rehydrate::RehydrationRegistry;
pub use scheduler::{DrainFailure, DrainReport, SchedulerState, SyncScheduler, SyncStatus};
pub use task::SyncTask;
pub use transport::{MockRemote, RemoteState};
