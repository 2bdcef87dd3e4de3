//! Team service keys: create, list, revoke.
//!
//! The one place that splices local list state instead of refreshing: a
//! freshly minted key is inserted at the head of the list and a revoked
//! key removed, so the raw-secret reveal can stay on screen.

use crate::client::TeamApi;
use crate::policy;
use crate::types::{TeamApiKey, TeamRole};
use crate::validators::validate_name;
use crate::{SecretString, TeamError};

pub struct ApiKeyPanel<A> {
    api: A,
    team_id: i64,
    keys: Vec<TeamApiKey>,
    can_manage: bool,
    error: Option<String>,
    pending: bool,
}

impl<A: TeamApi> ApiKeyPanel<A> {
    pub fn new(api: A, team_id: i64, keys: Vec<TeamApiKey>, viewer_role: Option<TeamRole>) -> Self {
        Self {
            api,
            team_id,
            keys,
            can_manage: viewer_role.is_some_and(policy::can_manage_keys),
            error: None,
            pending: false,
        }
    }

    /// The listed keys: metadata only, never a raw secret.
    pub fn keys(&self) -> &[TeamApiKey] {
        &self.keys
    }

    pub fn can_manage(&self) -> bool {
        self.can_manage
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mints a named key and returns the raw secret for the one-time
    /// reveal. The panel keeps only the metadata row; the secret is the
    /// caller's to show and forget.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "create_api_key", skip_all))]
    pub async fn create(&mut self, name: &str) -> Option<SecretString> {
        if self.pending {
            return None;
        }
        self.error = None;

        if !self.can_manage {
            self.error = Some(TeamError::Forbidden.to_string());
            return None;
        }
        if let Err(err) = validate_name(name) {
            self.error = Some(err.to_string());
            return None;
        }

        self.pending = true;
        let result = self.api.create_api_key(self.team_id, name).await;
        self.pending = false;

        match result {
            Ok(created) => {
                self.keys.insert(0, created.key);
                Some(created.raw_key)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Revokes a key and drops it from the local list.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "revoke_api_key", skip_all))]
    pub async fn revoke(&mut self, key_id: i64) {
        if self.pending {
            return;
        }
        self.error = None;

        if !self.can_manage {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }

        self.pending = true;
        let result = self.api.revoke_api_key(key_id).await;
        self.pending = false;

        match result {
            Ok(()) => self.keys.retain(|k| k.id != key_id),
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}
