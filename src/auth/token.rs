//! Bearer token authentication
//!
//! Serves an already-minted access token, either from the environment or
//! from the local credential store.

use crate::auth::provider::{AuthHeader, AuthProvider};
use crate::credentials::StoredToken;
use crate::error::AuthError;
use crate::util::{SecretString, unix_now};
use async_trait::async_trait;

/// Tokens this close to expiry are treated as expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Static bearer token provider
#[derive(Debug, Clone)]
pub struct BearerTokenProvider {
    resource_server: String,
    token: SecretString,
    expires_at: Option<i64>,
}

impl BearerTokenProvider {
    /// Create a new provider for `resource_server`
    pub fn new(
        resource_server: impl Into<String>,
        token: SecretString,
        expires_at: Option<i64>,
    ) -> Result<Self, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(Self {
            resource_server: resource_server.into(),
            token,
            expires_at,
        })
    }

    /// Build a provider from a credential store section
    pub fn from_stored(token: &StoredToken) -> Result<Self, AuthError> {
        Self::new(
            token.resource_server.clone(),
            token.access_token.clone(),
            token.expires_at_seconds,
        )
    }

    /// Create from environment variable
    ///
    /// Environment tokens carry no expiry; the service is the judge.
    pub fn from_env(resource_server: &str) -> Result<Self, AuthError> {
        let var = env_var_for(resource_server);
        match std::env::var(&var) {
            Ok(token) if !token.is_empty() => {
                Self::new(resource_server, SecretString::new(token), None)
            }
            _ => Err(AuthError::NotConfigured {
                resource_server: resource_server.to_string(),
            }),
        }
    }

    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - EXPIRY_SKEW_SECS <= now)
    }
}

/// Environment variable that overrides the stored token of a resource server
///
/// `transfer.api.globus.org` maps to `GLOBUS_SHARE_TRANSFER_TOKEN`,
/// `auth.globus.org` to `GLOBUS_SHARE_AUTH_TOKEN`.
pub fn env_var_for(resource_server: &str) -> String {
    let short = resource_server
        .split('.')
        .next()
        .unwrap_or(resource_server)
        .to_ascii_uppercase()
        .replace('-', "_");
    format!("GLOBUS_SHARE_{}_TOKEN", short)
}

#[async_trait]
impl AuthProvider for BearerTokenProvider {
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError> {
        if self.is_expired_at(unix_now()) {
            return Err(AuthError::TokenExpired {
                resource_server: self.resource_server.clone(),
            });
        }
        Ok(AuthHeader::bearer(self.token.clone()))
    }

    fn needs_refresh(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    fn resource_server(&self) -> &str {
        &self.resource_server
    }
}
