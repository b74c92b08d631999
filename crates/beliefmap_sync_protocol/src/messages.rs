//! HTTP message bodies for the state endpoint.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path of the state endpoint (GET, POST, DELETE).
pub const STATE_PATH: &str = "/api/state";

/// Path of the unauthenticated health endpoint.
pub const HEALTH_PATH: &str = "/api/health";

/// Query string of `GET`/`DELETE /api/state?key=K`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyQuery {
    /// Requested key.
    pub key: Option<String>,
}

impl KeyQuery {
    /// Creates a query for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// Returns the key if present and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Body of `GET /api/state` responses.
///
/// A found key carries the deserialized stored value and the server's
/// last write time. A missing key is `{"data": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Stored value, deserialized from its JSON text.
    #[serde(default)]
    pub data: Option<Value>,
    /// Server receipt time of the last write, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl StateResponse {
    /// Creates a response for a found key.
    pub fn found(data: Value, updated_at: i64) -> Self {
        Self {
            data: Some(data),
            updated_at: Some(updated_at),
        }
    }

    /// Creates a response for a missing key.
    pub fn missing() -> Self {
        Self {
            data: None,
            updated_at: None,
        }
    }
}

/// Body of `POST /api/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutStateRequest {
    /// Target key.
    pub key: String,
    /// Value to store. Clients send their serialized payload as a JSON string.
    pub value: Value,
}

impl PutStateRequest {
    /// Creates a request that stores `value` (already serialized text) under `key`.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::String(value.into()),
        }
    }

    /// Parses and validates a request body.
    ///
    /// `key` must be a non-empty string and `value` must be present
    /// (an explicit `null` counts as present).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] for invalid JSON and
    /// [`ProtocolError::MissingField`] when `key` or `value` is missing.
    pub fn from_body(body: &[u8]) -> ProtocolResult<Self> {
        let raw: Value = serde_json::from_slice(body)?;

        let key = raw
            .get("key")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or(ProtocolError::MissingField("key"))?;

        let value = raw
            .get("value")
            .cloned()
            .ok_or(ProtocolError::MissingField("value"))?;

        Ok(Self {
            key: key.to_string(),
            value,
        })
    }
}

/// Body of successful `POST` and `DELETE` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always true for a 200 response.
    pub success: bool,
}

impl AckResponse {
    /// Creates a successful acknowledgement.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Body of error responses (400, 401, 500).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

/// A value fetched from the server, normalized back to serialized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Serialized payload, exactly as the client stores it locally.
    pub data: String,
    /// Server receipt time of the last write, in milliseconds.
    pub updated_at: i64,
}

impl RemoteRecord {
    /// Converts a `GET` response body into a record.
    ///
    /// Returns `None` when the body carries no data. String data is used
    /// verbatim; any other JSON value is re-serialized. A missing
    /// `updated_at` is read as 0, which never supersedes a local value.
    pub fn from_response(response: StateResponse) -> Option<Self> {
        let data = match response.data? {
            Value::Null => return None,
            Value::String(s) => s,
            other => other.to_string(),
        };

        Some(Self {
            data,
            updated_at: response.updated_at.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_response_shape() {
        let body = serde_json::to_value(StateResponse::missing()).unwrap();
        assert_eq!(body, json!({ "data": null }));
    }

    #[test]
    fn found_response_shape() {
        let body = serde_json::to_value(StateResponse::found(json!("x"), 42)).unwrap();
        assert_eq!(body, json!({ "data": "x", "updated_at": 42 }));
    }

    #[test]
    fn key_query_rejects_empty() {
        assert_eq!(KeyQuery::default().key(), None);
        assert_eq!(KeyQuery::new("").key(), None);
        assert_eq!(KeyQuery::new("theme").key(), Some("theme"));
    }

    #[test]
    fn put_request_from_body() {
        let req = PutStateRequest::from_body(br#"{"key":"theme","value":"{\"dark\":true}"}"#)
            .unwrap();
        assert_eq!(req, PutStateRequest::new("theme", "{\"dark\":true}"));
    }

    #[test]
    fn put_request_null_value_is_present() {
        let req = PutStateRequest::from_body(br#"{"key":"k","value":null}"#).unwrap();
        assert_eq!(req.value, Value::Null);
    }

    #[test]
    fn put_request_missing_fields() {
        assert!(matches!(
            PutStateRequest::from_body(br#"{"value":"v"}"#),
            Err(ProtocolError::MissingField("key"))
        ));
        assert!(matches!(
            PutStateRequest::from_body(br#"{"key":"","value":"v"}"#),
            Err(ProtocolError::MissingField("key"))
        ));
        assert!(matches!(
            PutStateRequest::from_body(br#"{"key":"k"}"#),
            Err(ProtocolError::MissingField("value"))
        ));
        assert!(matches!(
            PutStateRequest::from_body(b"not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn remote_record_string_data_is_verbatim() {
        let record =
            RemoteRecord::from_response(StateResponse::found(json!("{\"a\":1}"), 7)).unwrap();
        assert_eq!(record.data, "{\"a\":1}");
        assert_eq!(record.updated_at, 7);
    }

    #[test]
    fn remote_record_object_data_is_reserialized() {
        let record =
            RemoteRecord::from_response(StateResponse::found(json!({ "a": 1 }), 7)).unwrap();
        assert_eq!(record.data, "{\"a\":1}");
    }

    #[test]
    fn remote_record_absent() {
        assert!(RemoteRecord::from_response(StateResponse::missing()).is_none());
        assert!(RemoteRecord::from_response(StateResponse::found(Value::Null, 5)).is_none());
    }

    #[test]
    fn state_response_tolerates_missing_fields() {
        let resp: StateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, StateResponse::missing());
    }
}
