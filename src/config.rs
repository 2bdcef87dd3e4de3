//! Configuration for the team module.

use chrono::Duration;

use crate::crypto::DEFAULT_TOKEN_LENGTH;

/// Settings shared by the invitation and service-key flows.
///
/// Use `RosterConfig::default()` for the production defaults.
#[derive(Debug, Clone)]
pub struct RosterConfig {
    /// How long a fresh invitation stays valid. Default: 7 days.
    ///
    /// Resending an invitation does not extend this window.
    pub invitation_expiry: Duration,

    /// Length of generated tokens in characters. Default: 32.
    pub token_length: usize,

    /// Name of the signed session cookie read by the access layer.
    pub session_cookie: &'static str,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            invitation_expiry: Duration::days(7),
            token_length: DEFAULT_TOKEN_LENGTH,
            session_cookie: "session",
        }
    }
}
