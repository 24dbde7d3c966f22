//! Error types for globus-share
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API,
//! and collapse everything into `anyhow` only at the binary boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Remote error code the Transfer API uses for a duplicate access rule.
pub const DUPLICATE_RULE_CODE: &str = "Exists";

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Credential store error: {0}")]
    Credential(#[from] CredentialError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the Transfer and Auth HTTP APIs
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (HTTP {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Unauthorized: invalid or expired token")]
    Unauthorized,

    #[error("Invalid response from API: {0}")]
    InvalidResponse(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Error body shared by the Transfer and Auth APIs
#[derive(serde::Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Create an appropriate error from an HTTP status code and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            429 => ApiError::RateLimited { retry_after: 60 },
            _ => {
                let parsed = serde_json::from_str::<ErrorBody>(body).ok();
                let (code, message) = match parsed {
                    Some(ErrorBody { code, message }) => (code, message),
                    None => (None, None),
                };
                ApiError::Api {
                    status,
                    code: code.unwrap_or_else(|| format!("HttpStatus{}", status)),
                    message: message.unwrap_or_else(|| {
                        if body.is_empty() {
                            format!("HTTP {}", status)
                        } else {
                            body.to_string()
                        }
                    }),
                }
            }
        }
    }

    /// Machine-readable error code, when the service supplied one
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Api { code, .. } => Some(code),
            ApiError::Unauthorized => Some("AuthenticationFailed"),
            _ => None,
        }
    }

    /// Whether the service rejected a create because the rule already exists
    pub fn is_duplicate(&self) -> bool {
        self.code() == Some(DUPLICATE_RULE_CODE)
    }
}

/// Failures of the reconciler operations
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Share path must be absolute: {}", path.display())]
    InvalidPath { path: PathBuf },

    #[error("No identity found for username '{username}'")]
    IdentityNotFound { username: String },

    #[error("Username '{username}' resolved to {count} identities")]
    AmbiguousIdentity { username: String, count: usize },

    #[error("Identity lookup for '{username}' failed: {source}")]
    IdentityLookupFailed {
        username: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to create share: {0}")]
    ShareFailed(#[source] ApiError),

    #[error("Failed to delete share {rule_id}: {source}")]
    RevokeFailed {
        rule_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to list shares: {0}")]
    ListFailed(#[source] ApiError),

    #[error("Local IO error on {}: {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShareError {
    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Remote error detail, if the failure came from the service
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ShareError::IdentityLookupFailed { source, .. }
            | ShareError::RevokeFailed { source, .. } => Some(source),
            ShareError::ShareFailed(source) | ShareError::ListFailed(source) => Some(source),
            _ => None,
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No token configured for resource server '{resource_server}'")]
    NotConfigured { resource_server: String },

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token for resource server '{resource_server}' has expired")]
    TokenExpired { resource_server: String },
}

/// Credential store and OAuth flow errors
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to access credential store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credential store: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize credential store: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Token response is missing resource server '{0}'")]
    MissingResourceServer(String),

    #[error("No refresh token stored for resource server '{0}'")]
    MissingRefreshToken(String),

    #[error("Token endpoint returned an empty access token for '{0}'")]
    EmptyAccessToken(String),

    #[error("OAuth request failed: {0}")]
    OAuth(#[from] ApiError),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for HTTP API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;
