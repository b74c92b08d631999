//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The storage file could not be parsed.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The in-memory map could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the write (quota exhausted, read-only medium).
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StorageError::Corrupted("trailing garbage".into());
        assert_eq!(err.to_string(), "storage corrupted: trailing garbage");

        let err = StorageError::WriteRejected("quota exceeded".into());
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn io_error_converts() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
