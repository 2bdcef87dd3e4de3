//! Active-team persistence.
//!
//! The last-chosen team id is the only client-side state this module
//! persists. It lives behind the [`KeyValueStore`] seam so the storage
//! mechanism (cookie, local storage, server session) is swappable without
//! touching call sites.

use crate::types::Team;

/// Storage key, which doubles as the cookie name.
pub const ACTIVE_TEAM_KEY: &str = "active-team";

/// Cookie lifetime: one year.
pub const ACTIVE_TEAM_MAX_AGE_SECS: u32 = 31_536_000;

/// Sentinel selection value that opens the team-creation flow instead of
/// switching. Never collides with a real id, which are numeric.
pub const CREATE_TEAM_SENTINEL: &str = "CREATE_NEW_TEAM";

/// Minimal get/set persistence adapter.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Typed wrapper over a [`KeyValueStore`] for the active-team id.
pub struct ActiveTeamStore<S> {
    store: S,
}

impl<S: KeyValueStore> ActiveTeamStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored id, if present and parseable.
    pub fn get(&self) -> Option<i64> {
        self.store.get(ACTIVE_TEAM_KEY)?.parse().ok()
    }

    pub fn set(&self, team_id: i64) {
        self.store.set(ACTIVE_TEAM_KEY, &team_id.to_string());
    }
}

/// Renders the `Set-Cookie` value used by a cookie-backed store.
pub fn active_team_cookie(team_id: i64) -> String {
    format!(
        "{ACTIVE_TEAM_KEY}={team_id}; Path=/; Max-Age={ACTIVE_TEAM_MAX_AGE_SECS}; SameSite=Lax"
    )
}

/// Extracts the active-team value from a `Cookie` request header.
pub fn read_active_team_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("active-team="))
        .filter(|v| !v.is_empty())
}

/// Reconciles a stored id against the teams the viewer currently belongs
/// to: the stored id wins if still valid, otherwise the first team,
/// otherwise nothing.
pub fn reconcile_active_team(stored: Option<i64>, teams: &[Team]) -> Option<i64> {
    if let Some(id) = stored {
        if teams.iter().any(|t| t.id == id) {
            return Some(id);
        }
    }
    teams.first().map(|t| t.id)
}
