//! Authentication provider trait
//!
//! API clients ask a provider for the bearer header of one resource server;
//! how the token was minted is not their concern.

use crate::error::AuthError;
use crate::util::SecretString;
// async_trait required for dyn-compatibility with Box<dyn AuthProvider>
use async_trait::async_trait;

/// Authentication provider trait
///
/// Implementations supply a bearer credential for a single resource server
/// (`transfer.api.globus.org` or `auth.globus.org`).
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get the authentication header for the next request
    ///
    /// Fails with [`AuthError::TokenExpired`] once the token is past its
    /// expiry, so callers never send a credential the service will reject.
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError>;

    /// Whether the token is expired or about to expire
    fn needs_refresh(&self) -> bool;

    /// Resource server the token is scoped to
    fn resource_server(&self) -> &str;
}

/// Bearer authentication header
#[derive(Debug, Clone)]
pub struct AuthHeader(SecretString);

impl AuthHeader {
    pub fn bearer(token: SecretString) -> Self {
        Self(token)
    }

    /// Get the header name
    pub fn header_name(&self) -> &'static str {
        "Authorization"
    }

    /// Get the header value
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

/// Box type alias for auth providers
pub type BoxedAuthProvider = Box<dyn AuthProvider>;
