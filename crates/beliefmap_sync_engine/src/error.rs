//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Acknowledgement of a remote write or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ack;

/// Errors that can occur during sync operations.
///
/// None of these reach application code through the storage contract;
/// they are carried by task handles and turned into queue membership.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The request did not complete within the configured timeout.
    #[error("operation timed out")]
    Timeout,

    /// The server rejected the credential (401).
    #[error("not authorized")]
    Unauthorized,

    /// The server rejected the request as malformed (4xx other than 401).
    #[error("request rejected with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },

    /// The server failed to process the request (5xx).
    #[error("server error with status {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The client is marked offline.
    #[error("not connected to server")]
    NotConnected,

    /// No Tokio runtime was available to run background work.
    #[error("no async runtime available")]
    NoRuntime,

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Maps a non-success HTTP status to an error.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            500..=599 => Self::ServerError { status },
            _ => Self::Rejected { status },
        }
    }

    /// Returns true if this error is expected to clear up on its own.
    ///
    /// Informational only: failed writes are queued regardless, so an
    /// unauthorized write keeps being retried until credentials are fixed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Timeout | SyncError::ServerError { .. } | SyncError::NotConnected => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection refused").is_retryable());
        assert!(!SyncError::transport_fatal("invalid url").is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::ServerError { status: 503 }.is_retryable());
        assert!(SyncError::NotConnected.is_retryable());
        assert!(!SyncError::Unauthorized.is_retryable());
        assert!(!SyncError::Rejected { status: 400 }.is_retryable());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(SyncError::from_status(401), SyncError::Unauthorized));
        assert!(matches!(
            SyncError::from_status(400),
            SyncError::Rejected { status: 400 }
        ));
        assert!(matches!(
            SyncError::from_status(500),
            SyncError::ServerError { status: 500 }
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(SyncError::NotConnected.to_string(), "not connected to server");
        assert!(SyncError::ServerError { status: 502 }.to_string().contains("502"));
    }
}
