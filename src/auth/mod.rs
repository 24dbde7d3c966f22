//! Authentication module
//!
//! Supplies bearer tokens to the API clients. Tokens are minted out-of-band
//! by `refresh-credential`; this module only serves them.

pub mod provider;
pub mod token;

pub use provider::{AuthHeader, AuthProvider, BoxedAuthProvider};
pub use token::{BearerTokenProvider, env_var_for};

use crate::credentials::CredentialStore;
use crate::error::AuthError;
use tracing::debug;

/// Create an auth provider for one resource server
///
/// An environment override wins over the credential store.
pub fn create_auth_provider(
    resource_server: &str,
    store: &CredentialStore,
) -> Result<BoxedAuthProvider, AuthError> {
    if let Ok(provider) = BearerTokenProvider::from_env(resource_server) {
        debug!(resource_server, "Using bearer token from environment");
        return Ok(Box::new(provider));
    }

    let stored = store
        .token(resource_server)
        .ok_or_else(|| AuthError::NotConfigured {
            resource_server: resource_server.to_string(),
        })?;

    debug!(
        resource_server,
        expires_at = ?stored.expires_at_seconds,
        "Using bearer token from credential store"
    );
    Ok(Box::new(BearerTokenProvider::from_stored(stored)?))
}
