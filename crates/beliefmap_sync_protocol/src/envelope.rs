//! Helpers for the persisted state envelope.
//!
//! Application state is stored as `{"state": {...fields, "_lastModified": ms}, "version": n}`.
//! The storage layer only ever looks at `state._lastModified`.

use serde_json::Value;

/// Name of the embedded last-modified field inside `state`.
pub const LAST_MODIFIED_FIELD: &str = "_lastModified";

/// Reads `state._lastModified` from a serialized envelope.
///
/// Returns 0 when the input is absent, not JSON, not an envelope, or the
/// field is missing or not an integer.
pub fn last_modified(raw: Option<&str>) -> i64 {
    raw.and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|envelope| {
            envelope
                .get("state")
                .and_then(|state| state.get(LAST_MODIFIED_FIELD))
                .and_then(Value::as_i64)
        })
        .unwrap_or(0)
}

/// Sets `state._lastModified` to `timestamp` in a serialized envelope.
///
/// Returns `None` if `raw` is not a JSON object with an object `state` field.
pub fn stamp(raw: &str, timestamp: i64) -> Option<String> {
    let mut envelope: Value = serde_json::from_str(raw).ok()?;
    let state = envelope.get_mut("state")?.as_object_mut()?;
    state.insert(LAST_MODIFIED_FIELD.into(), Value::from(timestamp));
    Some(envelope.to_string())
}
