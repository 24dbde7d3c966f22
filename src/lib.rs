//! Globus share manager
//!
//! Grants, revokes and lists per-user read/write access rules on a single
//! shared Globus endpoint.
//!
//! ## Features
//!
//! - **Idempotent sharing**: an existing rule for the same identity and path
//!   counts as success
//! - **Path-segment listing** with per-rule detail records
//! - **Forgiving deletes** that report failures without aborting
//! - **Local audit log** of every completed share and unshare
//! - **Credential bootstrap** via the native-app OAuth flow, with
//!   unattended refresh for cron
//!
//! ## Example Configuration
//!
//! ```toml
//! [endpoint]
//! id = "3aca022a-5e5b-11e6-8309-22000b97daec"
//!
//! [auth]
//! client_id = "26d64c4c-fcc2-4f7c-b056-62f185875af6"
//!
//! [credentials]
//! path = "~/.config/globus-share/credentials.toml"
//!
//! [share]
//! audit_log = "/var/log/globus_shares.log"
//! directory_mode = "750"
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod reconciler;
pub mod util;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use reconciler::{Reconciler, ReconcilerSettings, RevokeResult, ShareResult};
