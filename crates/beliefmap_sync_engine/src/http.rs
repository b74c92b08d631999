//! HTTP transport implementation.
//!
//! This module talks to the state server's `/api/state` endpoint using
//! `reqwest`, attaching the session credential to every request.

use crate::config::SyncConfig;
use crate::error::{Ack, SyncError, SyncResult};
use crate::transport::RemoteState;
use async_trait::async_trait;
use beliefmap_sync_protocol::{
    Credential, PutStateRequest, RemoteRecord, StateResponse, HEALTH_PATH, STATE_PATH,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the remote state service.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    /// Base URL of the state server (e.g., "https://beliefs.example.com").
    base_url: String,
    credential: Option<Credential>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Creates a new HTTP remote.
    pub fn new(base_url: impl Into<String>, credential: Option<Credential>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Creates an HTTP remote from a sync configuration.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.server_url.clone(),
            config.credential.clone(),
            config.request_timeout,
        )
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, STATE_PATH)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match &self.credential {
            Some(credential) => {
                let (name, value) = credential.header();
                request.header(name, value)
            }
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> SyncResult<Response> {
        self.authorize(request).send().await.map_err(map_transport)
    }

    /// Probes the unauthenticated health endpoint.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error if the server is unreachable or unhealthy.
    pub async fn health(&self) -> SyncResult<()> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_transport)?;
        check_status(&response)
    }
}

/// Converts a reqwest failure into a sync error.
fn map_transport(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else if err.is_builder() {
        SyncError::transport_fatal(err.to_string())
    } else {
        SyncError::transport_retryable(err.to_string())
    }
}

fn check_status(response: &Response) -> SyncResult<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SyncError::from_status(status.as_u16()))
    }
}

#[async_trait]
impl RemoteState for HttpRemote {
    async fn fetch(&self, key: &str) -> SyncResult<Option<RemoteRecord>> {
        let request = self.client.get(self.endpoint()).query(&[("key", key)]);
        let response = self.execute(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(key, "remote key absent");
            return Ok(None);
        }
        check_status(&response)?;

        let body: StateResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Protocol(format!("failed to decode state response: {e}")))?;

        Ok(RemoteRecord::from_response(body))
    }

    async fn send(&self, key: &str, value: &str) -> SyncResult<Ack> {
        let request = self
            .client
            .post(self.endpoint())
            .json(&PutStateRequest::new(key, value));
        let response = self.execute(request).await?;
        check_status(&response)?;
        Ok(Ack)
    }

    async fn delete(&self, key: &str) -> SyncResult<Ack> {
        let request = self.client.delete(self.endpoint()).query(&[("key", key)]);
        let response = self.execute(request).await?;
        check_status(&response)?;
        Ok(Ack)
    }
}
