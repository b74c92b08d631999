//! Request credentials.

use std::fmt;

/// Name of the session cookie carrying the credential.
pub const AUTH_COOKIE: &str = "auth-token";

/// A credential attached to every request to the state endpoint.
///
/// The server accepts either form; clients attach whichever their session has.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `Cookie: auth-token=<token>`.
    Cookie(String),
}

impl Credential {
    /// Returns the raw token.
    pub fn token(&self) -> &str {
        match self {
            Credential::Bearer(token) | Credential::Cookie(token) => token,
        }
    }

    /// Returns the HTTP header `(name, value)` carrying this credential.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credential::Bearer(token) => ("authorization", format!("Bearer {token}")),
            Credential::Cookie(token) => ("cookie", format!("{AUTH_COOKIE}={token}")),
        }
    }
}

// Tokens never appear in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
            Credential::Cookie(_) => f.write_str("Cookie(***)"),
        }
    }
}
