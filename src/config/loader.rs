//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. `GLOBUS_ENDPOINT_ID` for the endpoint id
//! 2. Environment variables (GLOBUS_SHARE__*)
//! 3. Configuration file (TOML)
//! 4. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "globus-share.toml",
    ".globus-share.toml",
    "~/.config/globus-share/config.toml",
    "/etc/globus-share/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_common(&app_config)?;

    Ok(app_config)
}

/// Load configuration for commands that manage shares
///
/// Requires `endpoint.id`.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let app_config = build_config(config_path)?;
    validate_config(&app_config)?;
    Ok(app_config)
}

/// Load configuration for the credential bootstrap
///
/// Requires `auth.client_id` but not `endpoint.id`.
pub fn load_bootstrap_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let app_config = build_config(config_path)?;
    validate_common(&app_config)?;

    if app_config
        .auth
        .client_id
        .as_deref()
        .is_none_or(|id| id.trim().is_empty())
    {
        return Err(ConfigError::Missing {
            field: "auth.client_id".to_string(),
        });
    }

    Ok(app_config)
}

/// Merge file and environment sources
fn build_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // First existing default path wins
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. GLOBUS_SHARE__ENDPOINT__ID, GLOBUS_SHARE__SHARE__AUDIT_LOG
    builder = builder.add_source(
        Environment::with_prefix("GLOBUS_SHARE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("auth.scopes"),
    );

    if let Ok(endpoint_id) = std::env::var("GLOBUS_ENDPOINT_ID")
        && !endpoint_id.is_empty()
    {
        builder = builder
            .set_override("endpoint.id", endpoint_id)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))
}

/// Checks that hold for every configuration, including test fixtures
fn validate_common(config: &AppConfig) -> Result<(), ConfigError> {
    validate_url(&config.transfer.url, "transfer.url")?;
    validate_url(&config.auth.url, "auth.url")?;

    if config.transfer.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "transfer.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.auth.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "auth.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.credentials.path.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "credentials.path".to_string(),
        });
    }

    if config.share.audit_log.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "share.audit_log".to_string(),
        });
    }

    Ok(())
}

/// Validate a configuration about to drive real API calls
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_common(config)?;

    if config.endpoint.id.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "endpoint.id (set GLOBUS_ENDPOINT_ID environment variable)".to_string(),
        });
    }

    Ok(())
}

fn validate_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::Missing {
            field: field.to_string(),
        });
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Invalid {
            message: format!("{} must start with http:// or https://, got: {}", field, url),
        });
    }

    Ok(())
}
