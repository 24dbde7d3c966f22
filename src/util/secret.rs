//! Secret string type for safe token handling.
//!
//! Provides a wrapper type that prevents accidental logging of sensitive values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wrapper for secrets that prevents accidental logging.
///
/// `SecretString` ensures that bearer and refresh tokens are not accidentally
/// exposed through debug output, logs, or error messages.
///
/// # Features
/// - `Debug` and `Display` implementations show `[REDACTED]` instead of the value
/// - Explicit `expose_secret()` method required to access the actual value
/// - Clears memory on drop (best-effort, not cryptographically secure)
/// - `Serialize` writes the raw value; it exists only for the credential store
///
/// # Example
/// ```ignore
/// let token = SecretString::new("AgDk...");
///
/// // Debug output shows [REDACTED]
/// println!("{:?}", token);  // Output: [REDACTED]
///
/// // Explicit access required
/// let value = token.expose_secret();
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicitly expose the secret value.
    ///
    /// Use this method only when the secret value is actually needed,
    /// such as when constructing authentication headers.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Whether the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Best-effort only: earlier copies of the token may still live elsewhere.
        self.0.clear();
        self.0.shrink_to_fit();
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
