//! Local credential store
//!
//! A TOML file with one section per resource server:
//!
//! ```toml
//! [transfer]
//! resource_server = "transfer.api.globus.org"
//! access_token = "..."
//! refresh_token = "..."
//! scope = "urn:globus:auth:scope:transfer.api.globus.org:all"
//! expires_at_seconds = 1760000000
//! ```
//!
//! The file is read once per invocation and only ever replaced wholesale.

use crate::config::{AUTH_RESOURCE_SERVER, TRANSFER_RESOURCE_SERVER};
use crate::error::CredentialError;
use crate::util::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::debug;

/// Tokens issued for one resource server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub resource_server: String,
    pub access_token: SecretString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_seconds: Option<i64>,
}

/// Contents of the credential store file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<StoredToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<StoredToken>,
}

impl CredentialStore {
    /// Read the store; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Credential store not found, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CredentialError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(toml::from_str(&contents)?)
    }

    /// Replace the store on disk
    ///
    /// Writes a sibling temp file (mode `0600` on unix) and renames it over
    /// the old store, so readers see either the old or the new contents.
    pub fn save(&self, path: &Path) -> Result<(), CredentialError> {
        let io_err = |source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        };
        let contents = toml::to_string(self)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path).map_err(io_err)?;
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp_path, path).map_err(io_err)?;
        debug!(path = %path.display(), "Credential store written");
        Ok(())
    }

    /// Token for a resource server, if stored
    pub fn token(&self, resource_server: &str) -> Option<&StoredToken> {
        match resource_server {
            TRANSFER_RESOURCE_SERVER => self.transfer.as_ref(),
            AUTH_RESOURCE_SERVER => self.auth.as_ref(),
            _ => [self.transfer.as_ref(), self.auth.as_ref()]
                .into_iter()
                .flatten()
                .find(|t| t.resource_server == resource_server),
        }
    }

    /// Store a token in the section of its resource server
    ///
    /// Returns false for resource servers this tool has no section for.
    pub fn set(&mut self, token: StoredToken) -> bool {
        match token.resource_server.as_str() {
            TRANSFER_RESOURCE_SERVER => self.transfer = Some(token),
            AUTH_RESOURCE_SERVER => self.auth = Some(token),
            _ => return false,
        }
        true
    }

    /// All stored sections
    pub fn tokens(&self) -> impl Iterator<Item = &StoredToken> {
        [self.transfer.as_ref(), self.auth.as_ref()]
            .into_iter()
            .flatten()
    }
}
