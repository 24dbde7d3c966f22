//! ACL reconciler
//!
//! Keeps exactly one read/write rule per (endpoint, identity, path) on the
//! configured endpoint:
//!
//! ```text
//! Absent --ensure_share--> Present --revoke_share--> Absent
//!            (idempotent)
//! ```
//!
//! Identity resolution, rule storage and duplicate detection all happen on
//! the remote service; the reconciler sequences the calls, prepares the
//! local directory and keeps the audit log.

pub mod filter;
pub mod local;
pub mod store;

pub use filter::PathFilter;
pub use local::{DirectoryState, prepare_share_dir};
pub use store::{AclStore, IdentityDirectory};

use crate::api::types::{AccessRule, NewAccessRule};
use crate::audit::{AuditEvent, AuditLog};
use crate::config::{AppConfig, DirMode};
use crate::error::ShareError;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of [`Reconciler::ensure_share`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareResult {
    /// A new rule was created
    Created { rule_id: String },
    /// The service already holds this rule
    AlreadyExists,
}

/// Outcome of [`Reconciler::revoke_share`]
///
/// Failures are values here: a failed delete is reported, never raised.
#[derive(Debug)]
pub enum RevokeResult {
    Deleted,
    Failed(ShareError),
}

impl RevokeResult {
    pub fn is_deleted(&self) -> bool {
        matches!(self, RevokeResult::Deleted)
    }
}

/// Everything the reconciler needs besides its remote collaborators
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    pub endpoint_id: String,
    pub identity_domain: String,
    pub directory_mode: DirMode,
    pub audit_log: PathBuf,
}

impl ReconcilerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            endpoint_id: config.endpoint.id.clone(),
            identity_domain: config.auth.identity_domain.clone(),
            directory_mode: config.share.directory_mode,
            audit_log: config.share.audit_log_path(),
        }
    }
}

/// Reconciles access rules on one endpoint
pub struct Reconciler {
    store: Arc<dyn AclStore>,
    identities: Arc<dyn IdentityDirectory>,
    endpoint_id: String,
    identity_domain: String,
    directory_mode: DirMode,
    audit: AuditLog,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn AclStore>,
        identities: Arc<dyn IdentityDirectory>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            store,
            identities,
            endpoint_id: settings.endpoint_id,
            identity_domain: settings.identity_domain,
            directory_mode: settings.directory_mode,
            audit: AuditLog::new(settings.audit_log),
        }
    }

    /// Username as sent to the identity lookup
    ///
    /// Bare names get the configured identity domain; names that already
    /// carry a domain are used as-is.
    pub fn qualify_username(&self, username: &str) -> String {
        if username.contains('@') || self.identity_domain.is_empty() {
            username.to_string()
        } else {
            format!("{}@{}", username, self.identity_domain)
        }
    }

    /// Resolve a username to its identity id
    ///
    /// More than one match is an error rather than a silent first pick.
    #[instrument(skip(self))]
    pub async fn resolve_identity(&self, username: &str) -> Result<String, ShareError> {
        let qualified = self.qualify_username(username);
        let mut matches = self.identities.lookup(&qualified).await.map_err(|source| {
            ShareError::IdentityLookupFailed {
                username: qualified.clone(),
                source,
            }
        })?;

        match matches.len() {
            0 => Err(ShareError::IdentityNotFound {
                username: qualified,
            }),
            1 => {
                let identity = matches.remove(0);
                info!(username = %qualified, identity_id = %identity.id, "Resolved identity");
                Ok(identity.id)
            }
            count => Err(ShareError::AmbiguousIdentity {
                username: qualified,
                count,
            }),
        }
    }

    /// Ensure a read/write rule exists for `username` on `path`
    ///
    /// The local directory is prepared before any remote call, so a local
    /// failure leaves no remote state behind. Only a newly created rule is
    /// written to the audit log.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn ensure_share(&self, path: &Path, username: &str) -> Result<ShareResult, ShareError> {
        if !path.is_absolute() {
            return Err(ShareError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        prepare_share_dir(path, self.directory_mode)?;

        let principal = self.resolve_identity(username).await?;
        let rule = NewAccessRule::read_write(principal, rule_path(path));

        match self.store.create_rule(&self.endpoint_id, &rule).await {
            Ok(rule_id) => {
                info!(%rule_id, username, "Share created");
                self.audit
                    .record(&AuditEvent::Shared {
                        path,
                        username,
                        rule_id: &rule_id,
                    })
                    .map_err(|e| ShareError::local_io(self.audit.path(), e))?;
                Ok(ShareResult::Created { rule_id })
            }
            Err(e) if e.is_duplicate() => {
                info!(username, "Share already exists");
                Ok(ShareResult::AlreadyExists)
            }
            Err(e) => Err(ShareError::ShareFailed(e)),
        }
    }

    /// Delete a rule by id
    ///
    /// Never fails: remote errors come back as [`RevokeResult::Failed`]
    /// and leave the audit log alone.
    #[instrument(skip(self))]
    pub async fn revoke_share(&self, rule_id: &str) -> RevokeResult {
        if let Err(source) = self.store.delete_rule(&self.endpoint_id, rule_id).await {
            warn!(error = %source, "Share deletion failed");
            return RevokeResult::Failed(ShareError::RevokeFailed {
                rule_id: rule_id.to_string(),
                source,
            });
        }

        info!("Share deleted");
        if let Err(e) = self.audit.record(&AuditEvent::Unshared { rule_id }) {
            warn!(
                error = %e,
                audit_log = %self.audit.path().display(),
                "Failed to record share deletion in audit log"
            );
        }
        RevokeResult::Deleted
    }

    /// List the endpoint's rules, optionally narrowed to a path segment
    ///
    /// The rule set is fetched up front; a failure there yields no partial
    /// listing. Detail records for filtered matches are fetched as the
    /// returned listing is streamed.
    #[instrument(skip(self))]
    pub async fn list_shares(&self, filter: Option<&str>) -> Result<ShareListing<'_>, ShareError> {
        let rules = self
            .store
            .list_rules(&self.endpoint_id)
            .await
            .map_err(ShareError::ListFailed)?;

        let listing = match filter.and_then(PathFilter::new) {
            None => ShareListing {
                reconciler: self,
                rules,
                detailed: false,
            },
            Some(filter) => {
                let (rules, implicit): (Vec<_>, Vec<_>) = rules
                    .into_iter()
                    .filter(|rule| filter.matches(&rule.path))
                    .partition(|rule| rule.id.is_some());
                if !implicit.is_empty() {
                    debug!(
                        count = implicit.len(),
                        "Skipping matched rules without an id, no detail record exists"
                    );
                }
                ShareListing {
                    reconciler: self,
                    rules,
                    detailed: true,
                }
            }
        };

        info!(count = listing.len(), "Listed shares");
        Ok(listing)
    }
}

/// Rules selected by [`Reconciler::list_shares`]
pub struct ShareListing<'a> {
    reconciler: &'a Reconciler,
    rules: Vec<AccessRule>,
    detailed: bool,
}

impl ShareListing<'_> {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a filter was applied and detail records will be fetched
    ///
    /// Detailed listings never contain rules without an id.
    pub fn is_detailed(&self) -> bool {
        self.detailed
    }

    /// Records as returned by the list call
    pub fn abbreviated(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Stream the rules, fetching detail records for filtered listings
    ///
    /// Each call starts a fresh pass over the listing.
    pub fn stream(&self) -> impl Stream<Item = Result<AccessRule, ShareError>> + '_ {
        let reconciler = self.reconciler;
        let detailed = self.detailed;
        stream::iter(self.rules.iter()).then(move |rule| async move {
            match (&rule.id, detailed) {
                (Some(id), true) => reconciler
                    .store
                    .get_rule(&reconciler.endpoint_id, id)
                    .await
                    .map_err(ShareError::ListFailed),
                _ => Ok(rule.clone()),
            }
        })
    }

    /// Collect the whole stream, stopping at the first failed detail request
    pub async fn collect(&self) -> Result<Vec<AccessRule>, ShareError> {
        self.stream().try_collect().await
    }
}

/// Rule path for a local share directory; directory rules end in `/`
pub fn rule_path(path: &Path) -> String {
    let mut rendered = path.to_string_lossy().into_owned();
    if !rendered.ends_with('/') {
        rendered.push('/');
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_path_trailing_slash() {
        assert_eq!(rule_path(Path::new("/data/bulk/proj1")), "/data/bulk/proj1/");
        assert_eq!(rule_path(Path::new("/data/bulk/proj1/")), "/data/bulk/proj1/");
    }
}
