//! Error types for protocol encoding and decoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding protocol data.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Body is not valid JSON or does not match the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required field is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
