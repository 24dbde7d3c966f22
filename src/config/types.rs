//! Configuration types for globus-share
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;

use crate::util::expand_path;

/// Resource server whose tokens authorize Transfer API calls
pub const TRANSFER_RESOURCE_SERVER: &str = "transfer.api.globus.org";

/// Resource server whose tokens authorize Auth API calls
pub const AUTH_RESOURCE_SERVER: &str = "auth.globus.org";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Transfer API connection settings
    pub transfer: TransferConfig,

    /// Auth API and OAuth client settings
    pub auth: AuthConfig,

    /// The shared endpoint all rules live on
    pub endpoint: EndpointConfig,

    /// Local credential store
    pub credentials: CredentialsConfig,

    /// Local side effects of share operations
    pub share: ShareConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Transfer API connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Transfer API base URL including the version prefix
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for requests that never reached the service
    pub max_retries: u32,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            url: "https://transfer.api.globus.org/v0.10".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            verify_ssl: true,
        }
    }
}

impl TransferConfig {
    /// Base URL without a trailing slash
    pub fn api_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }
}

/// Auth API and native-app OAuth client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Auth service base URL
    pub url: String,

    /// Native app client id registered with the Auth service
    pub client_id: Option<String>,

    /// Redirect URI that displays the authorization code for pasting
    pub redirect_uri: String,

    /// Scopes requested during the interactive flow
    pub scopes: Vec<String>,

    /// Domain appended to bare usernames during identity lookup
    pub identity_domain: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: "https://auth.globus.org".to_string(),
            client_id: None,
            redirect_uri: "https://auth.globus.org/v2/web/auth-code".to_string(),
            scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
                "urn:globus:auth:scope:transfer.api.globus.org:all".to_string(),
            ],
            identity_domain: "globusid.org".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AuthConfig {
    /// Base URL without a trailing slash
    pub fn api_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }
}

/// Shared endpoint configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint id; required, there is no built-in default
    pub id: String,
}

/// Credential store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Path of the TOML credential store (`~` is expanded)
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        let path = dirs::config_dir()
            .map(|dir| dir.join("globus-share").join("credentials.toml"))
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "~/.config/globus-share/credentials.toml".to_string());
        Self { path }
    }
}

impl CredentialsConfig {
    /// Expanded credential store location
    pub fn resolved_path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

/// Local side effects of share operations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Append-only audit log of completed share/unshare actions
    pub audit_log: String,

    /// Mode applied to share directories this tool creates
    pub directory_mode: DirMode,

    /// Delay before the first network call of each command
    pub startup_grace_secs: u64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            audit_log: "/var/log/globus_shares.log".to_string(),
            directory_mode: DirMode::default(),
            startup_grace_secs: 0,
        }
    }
}

impl ShareConfig {
    /// Expanded audit log location
    pub fn audit_log_path(&self) -> PathBuf {
        expand_path(&self.audit_log)
    }
}

/// Unix permission bits for created share directories.
///
/// Written as an octal string in config (`"750"`, `"0777"`) so that the
/// same spelling works in TOML and in environment variables.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DirMode(u32);

impl DirMode {
    /// Least-privilege default: owner rwx, group rx
    pub const DEFAULT: DirMode = DirMode(0o750);

    /// World-writable mode, opt-in only
    pub const LEGACY_WORLD_WRITABLE: DirMode = DirMode(0o777);

    /// Parse octal permission bits, rejecting anything above `7777`
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches("0o");
        if digits.is_empty() {
            return None;
        }
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|bits| *bits <= 0o7777)
            .map(DirMode)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether "other" users may write into the directory
    pub fn is_world_writable(self) -> bool {
        self.0 & 0o002 != 0
    }
}

impl Default for DirMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for DirMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirMode({:04o})", self.0)
    }
}

impl fmt::Display for DirMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl<'de> Deserialize<'de> for DirMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DirMode::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid directory mode '{}', expected octal permission bits such as \"750\"",
                raw
            ))
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
