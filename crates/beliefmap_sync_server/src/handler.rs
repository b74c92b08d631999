//! Request handlers for the state endpoint.

use crate::auth::Authenticator;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::StateTable;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use beliefmap_sync_protocol::{AckResponse, HealthResponse, KeyQuery, PutStateRequest, StateResponse};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Context for request handling.
#[derive(Debug)]
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// State table (shared across all handlers).
    pub table: Arc<StateTable>,
    /// Credential check applied to every state request.
    pub auth: Authenticator,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, table: Arc<StateTable>) -> Self {
        let auth = Authenticator::new(config.api_secret.clone());
        Self {
            config,
            table,
            auth,
        }
    }
}

/// Handler for state requests.
///
/// Transport-independent: the axum routes below only extract the request
/// parts and delegate here.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Returns the handler context.
    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    fn require_key(query: &KeyQuery) -> ServerResult<&str> {
        query
            .key()
            .ok_or_else(|| ServerError::InvalidRequest("Missing key".into()))
    }

    /// Handles `GET /api/state?key=K`. `Ok(None)` means the key is absent.
    pub fn handle_get(&self, headers: &HeaderMap, query: &KeyQuery) -> ServerResult<Option<StateResponse>> {
        self.context.auth.authorize(headers)?;
        let key = Self::require_key(query)?;

        let Some(row) = self.context.table.get(key)? else {
            return Ok(None);
        };
        // Rows are written from parsed JSON, so this only falls back for foreign data
        let data = serde_json::from_str(&row.value).unwrap_or(Value::String(row.value));
        Ok(Some(StateResponse::found(data, row.updated_at)))
    }

    /// Handles `POST /api/state` with a `{key, value}` body.
    pub fn handle_put(&self, headers: &HeaderMap, body: &[u8]) -> ServerResult<AckResponse> {
        self.context.auth.authorize(headers)?;
        let request = PutStateRequest::from_body(body)?;

        let updated_at = self
            .context
            .table
            .upsert(&request.key, request.value.to_string())?;
        debug!(key = %request.key, updated_at, "state stored");
        Ok(AckResponse::ok())
    }

    /// Handles `DELETE /api/state?key=K`.
    pub fn handle_delete(&self, headers: &HeaderMap, query: &KeyQuery) -> ServerResult<AckResponse> {
        self.context.auth.authorize(headers)?;
        let key = Self::require_key(query)?;

        self.context.table.delete(key)?;
        debug!(key, "state deleted");
        Ok(AckResponse::ok())
    }
}

pub(crate) async fn get_state(
    State(handler): State<RequestHandler>,
    headers: HeaderMap,
    Query(query): Query<KeyQuery>,
) -> Result<Response, ServerError> {
    match handler.handle_get(&headers, &query)? {
        Some(found) => Ok(Json(found).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(StateResponse::missing())).into_response()),
    }
}

pub(crate) async fn put_state(
    State(handler): State<RequestHandler>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AckResponse>, ServerError> {
    handler.handle_put(&headers, &body).map(Json)
}

pub(crate) async fn delete_state(
    State(handler): State<RequestHandler>,
    headers: HeaderMap,
    Query(query): Query<KeyQuery>,
) -> Result<Json<AckResponse>, ServerError> {
    handler.handle_delete(&headers, &query).map(Json)
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
