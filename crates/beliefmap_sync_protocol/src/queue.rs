//! Persisted layout of the pending-write queue.

use serde::{Deserialize, Serialize};

/// Reserved local key under which the pending-write queue is stored.
pub const SYNC_QUEUE_KEY: &str = "__sync_queue";

/// A write that has not yet been acknowledged by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Target key.
    pub name: String,
    /// Serialized payload to send.
    pub value: String,
    /// Local enqueue time in milliseconds. Diagnostic only.
    pub timestamp: i64,
}

impl QueueItem {
    /// Creates a queue item.
    pub fn new(name: impl Into<String>, value: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp,
        }
    }
}

/// Decodes a persisted queue.
///
/// Absent or unparsable content yields an empty queue.
pub fn decode_queue(raw: Option<&str>) -> Vec<QueueItem> {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

/// Encodes a queue as a JSON array of `{name, value, timestamp}`.
pub fn encode_queue(items: &[QueueItem]) -> String {
    // A Vec of plain string/integer structs always serializes
    serde_json::to_string(items).unwrap_or_else(|_| "[]".into())
}
