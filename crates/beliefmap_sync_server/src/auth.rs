//! Authentication support for the state server.
//!
//! Every request to the state endpoint must present the shared API secret,
//! either as `Authorization: Bearer <secret>` or as the `auth-token` cookie.
//! When the server has no secret configured, nothing is accepted.

use crate::error::{ServerError, ServerResult};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use beliefmap_sync_protocol::AUTH_COOKIE;

/// Validates request credentials against the shared secret.
#[derive(Clone)]
pub struct Authenticator {
    secret: Option<Vec<u8>>,
}

impl Authenticator {
    /// Creates an authenticator. `None` rejects every request.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.map(String::into_bytes),
        }
    }

    /// Returns true if a secret is configured.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks the request headers.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Unauthorized`] unless the bearer token or the
    /// auth cookie matches the secret. Each credential is checked on its own,
    /// so a stale bearer header does not hide a valid cookie.
    pub fn authorize(&self, headers: &HeaderMap) -> ServerResult<()> {
        let Some(secret) = &self.secret else {
            return Err(ServerError::Unauthorized);
        };

        let matches = |token: Option<&str>| {
            token.is_some_and(|token| constant_time_eq(token.as_bytes(), secret))
        };
        if matches(bearer_token(headers)) || matches(cookie_token(headers)) {
            Ok(())
        } else {
            Err(ServerError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, token)| token)
}

/// Compares two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
