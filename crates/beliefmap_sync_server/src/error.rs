//! Error types for the state server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use beliefmap_storage::StorageError;
use beliefmap_sync_protocol::{ErrorResponse, ProtocolError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the state server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or wrong credential.
    #[error("unauthorized")]
    Unauthorized,

    /// The state table failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServerError::InvalidRequest(_) | ServerError::Unauthorized)
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        // Internal details stay in the log
        let message = match &self {
            ServerError::InvalidRequest(msg) => msg.clone(),
            ServerError::Unauthorized => "Unauthorized".to_string(),
            _ => "Internal server error".to_string(),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
