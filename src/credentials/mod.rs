//! Credential bootstrap and storage
//!
//! The reconciler only ever reads tokens. Minting them is a separate,
//! operator-driven step: an interactive authorization once, then
//! unattended refreshes (typically from cron) until the refresh token is
//! revoked.

pub mod oauth;
pub mod store;

pub use oauth::{NativeAppClient, PendingAuthorization, TokenResponse};
pub use store::{CredentialStore, StoredToken};

use crate::config::{AUTH_RESOURCE_SERVER, TRANSFER_RESOURCE_SERVER};
use crate::error::CredentialError;
use crate::util::unix_now;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

/// Resource servers the tool needs tokens for
pub const REQUIRED_RESOURCE_SERVERS: &[&str] = &[TRANSFER_RESOURCE_SERVER, AUTH_RESOURCE_SERVER];

/// Run the interactive authorization and write a fresh credential store
///
/// Prints the authorize URL to `output` and reads the pasted code from
/// `input`. Token values are never written to `output` or the logs.
pub async fn bootstrap_interactive(
    client: &NativeAppClient,
    store_path: &Path,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<CredentialStore, CredentialError> {
    let io_err = |source| CredentialError::Io {
        path: store_path.to_path_buf(),
        source,
    };
    let pending = client.start_flow()?;

    writeln!(
        output,
        "Please go to this URL and login: {}",
        pending.authorize_url
    )
    .map_err(io_err)?;
    write!(output, "Please enter the code you get after login here: ").map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut code = String::new();
    input.read_line(&mut code).map_err(io_err)?;

    let response = client.exchange_code(&pending, code.trim()).await?;
    let mut store = CredentialStore::default();
    for token in response.by_resource_server(unix_now()) {
        let resource_server = token.resource_server.clone();
        if !store.set(token) {
            warn!(%resource_server, "Ignoring token for unused resource server");
        }
    }

    ensure_complete(&store)?;
    store.save(store_path)?;
    log_summary(&store, "Credential store created");
    Ok(store)
}

/// Renew every stored access token from its refresh token
///
/// The store is rewritten only when every section received a new,
/// non-empty access token.
pub async fn refresh_stored(
    client: &NativeAppClient,
    store_path: &Path,
) -> Result<CredentialStore, CredentialError> {
    let current = CredentialStore::load(store_path)?;
    ensure_complete(&current)?;

    let mut renewed = CredentialStore::default();
    for token in current.tokens() {
        let refresh_token = token
            .refresh_token
            .as_ref()
            .ok_or_else(|| CredentialError::MissingRefreshToken(token.resource_server.clone()))?;

        let response = client.refresh(refresh_token).await?;
        if response.access_token.is_empty() {
            return Err(CredentialError::EmptyAccessToken(
                token.resource_server.clone(),
            ));
        }
        renewed.set(oauth::renewed_token(token, &response));
    }

    renewed.save(store_path)?;
    log_summary(&renewed, "Credential store refreshed");
    Ok(renewed)
}

fn ensure_complete(store: &CredentialStore) -> Result<(), CredentialError> {
    for resource_server in REQUIRED_RESOURCE_SERVERS {
        if store.token(resource_server).is_none() {
            return Err(CredentialError::MissingResourceServer(
                resource_server.to_string(),
            ));
        }
    }
    Ok(())
}

fn log_summary(store: &CredentialStore, message: &str) {
    for token in store.tokens() {
        info!(
            resource_server = %token.resource_server,
            scope = token.scope.as_deref().unwrap_or(""),
            expires_at = ?token.expires_at_seconds,
            has_refresh_token = token.refresh_token.is_some(),
            "{}",
            message
        );
    }
}
