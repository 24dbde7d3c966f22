//! Utility functions shared across the application.

mod secret;

pub use secret::SecretString;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Expand `~` and environment variables in a configured path.
///
/// Falls back to the literal value when a referenced variable is unset.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

/// Seconds since the unix epoch.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Percent-encode a value for use as a single URL path segment.
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
