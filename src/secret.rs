//! Sensitive data wrapper types.
//!
//! Invitation tokens and raw service keys travel through view-model state
//! and API responses; wrapping them keeps the values out of logs.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A wrapper for sensitive string data that prevents accidental logging.
///
/// `SecretString` implements `Debug` and `Display` to show `[REDACTED]`
/// instead of the actual content.
///
/// # Example
///
/// ```rust
/// use roster::SecretString;
///
/// let raw_key = SecretString::new("ne_team_4fT9zQ...");
///
/// // Debug output shows [REDACTED]
/// assert_eq!(format!("{:?}", raw_key), "SecretString([REDACTED])");
///
/// // Access the actual value when needed
/// assert!(raw_key.expose_secret().starts_with("ne_team_"));
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new `SecretString` from any type that can be converted to a `String`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the secret value.
    ///
    /// Use this only where the raw value is genuinely needed, such as
    /// hashing it or rendering the one-time reveal.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Expose the actual value for serialization (e.g., the one-time key reveal)
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString(s))
    }
}
