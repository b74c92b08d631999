//! # beliefmap Storage
//!
//! Key-value storage backends for beliefmap.
//!
//! This crate provides the lowest-level persistence abstraction used by both
//! the sync client (its local durable store) and the state server (its single
//! key/value table). Backends are **opaque string stores** - they do not
//! interpret the values they hold.
//!
//! ## Design Principles
//!
//! - Backends map string keys to string values (get, put, remove, keys)
//! - Every operation is fallible; callers decide whether to swallow errors
//! - Must be `Send + Sync` for concurrent access
//! - No knowledge of sync queues, envelopes or timestamps
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage in a directory on disk
//!
//! ## Example
//!
//! ```rust
//! use beliefmap_storage::{InMemoryBackend, KvBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.put("flow-storage", "{\"state\":{}}").unwrap();
//! assert_eq!(backend.get("flow-storage").unwrap().as_deref(), Some("{\"state\":{}}"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KvBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
