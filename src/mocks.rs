//! In-memory doubles for the crate's seams.
//!
//! [`MockBackend`] stands in for the remote API, the key store, the
//! session provider and the team directory at once, mirroring the
//! server-side rules this layer renders around (single owner, invite
//! conflicts, single-use tokens). [`MockNavigator`] and [`MemoryStore`]
//! record navigation and persistence effects for assertions.

#![allow(clippy::significant_drop_tightening, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::access::{ApiKeyValidator, SessionProvider, TeamDirectory};
use crate::client::{InviteOutcome, Navigator, TeamApi};
use crate::config::RosterConfig;
use crate::crypto::{generate_token, hash_token, mint_service_key};
use crate::state::KeyValueStore;
use crate::types::{
    CreatedApiKey, Invitation, Team, TeamApiKey, TeamMember, TeamRole, TeamWithRelations, User,
};
use crate::validators::validate_name;
use crate::{SecretString, TeamError};

struct StoredInvitation {
    invitation: Invitation,
    resend_count: u32,
}

struct StoredKey {
    key: TeamApiKey,
    key_hash: String,
}

#[derive(Default)]
struct BackendState {
    users: Vec<User>,
    teams: Vec<Team>,
    members: Vec<TeamMember>,
    invitations: Vec<StoredInvitation>,
    api_keys: Vec<StoredKey>,
    /// session id -> user id
    sessions: HashMap<String, i64>,
    /// Caller identity for [`TeamApi::create_team`], set via `sign_in`.
    current_user: Option<i64>,
}

/// The in-memory backend.
///
/// Clones share state, so a test can hand the same backend to several
/// view-models and assert against it directly.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<BackendState>,
    next_id: AtomicI64,
    config: RosterConfig,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_config(RosterConfig::default())
    }

    pub fn with_config(config: RosterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(BackendState::default()),
                next_id: AtomicI64::new(1),
                config,
            }),
        }
    }

    fn next_id(&self) -> i64 {
        self.inner.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BackendState>, TeamError> {
        self.inner
            .state
            .read()
            .map_err(|_| TeamError::Internal("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BackendState>, TeamError> {
        self.inner
            .state
            .write()
            .map_err(|_| TeamError::Internal("lock poisoned".into()))
    }

    // Seeding helpers. These bypass the API surface to arrange server
    // state directly, the way fixtures seed the database in e2e suites.

    pub fn seed_user(&self, name: Option<&str>, email: &str) -> User {
        let user = User {
            id: self.next_id(),
            name: name.map(ToOwned::to_owned),
            email: email.to_owned(),
        };
        self.state_mut().users.push(user.clone());
        user
    }

    pub fn seed_team(&self, name: &str) -> Team {
        let team = Team {
            id: self.next_id(),
            name: name.to_owned(),
        };
        self.state_mut().teams.push(team.clone());
        team
    }

    pub fn seed_member(&self, team: &Team, user: &User, role: TeamRole) -> TeamMember {
        let member = TeamMember {
            id: self.next_id(),
            team_id: team.id,
            user_id: user.id,
            role,
            created_at: Utc::now(),
            user: user.clone(),
        };
        self.state_mut().members.push(member.clone());
        member
    }

    /// Seeds an invitation and returns it with the raw token.
    pub fn seed_invitation(
        &self,
        team: &Team,
        email: &str,
        role: TeamRole,
        expires_at: DateTime<Utc>,
    ) -> (Invitation, SecretString) {
        let token = generate_token(self.inner.config.token_length);
        let invitation = Invitation {
            id: self.next_id(),
            team_id: team.id,
            email: email.to_owned(),
            role,
            token_hash: hash_token(&token),
            expires_at,
            accepted_at: None,
            created_at: Utc::now(),
        };
        self.state_mut().invitations.push(StoredInvitation {
            invitation: invitation.clone(),
            resend_count: 0,
        });
        (invitation, SecretString::new(token))
    }

    pub fn seed_api_key(&self, team: &Team, name: &str) -> CreatedApiKey {
        let raw_key = mint_service_key(self.inner.config.token_length);
        let key = TeamApiKey {
            id: self.next_id(),
            team_id: team.id,
            name: name.to_owned(),
            last_used_at: None,
            created_at: Utc::now(),
        };
        self.state_mut().api_keys.push(StoredKey {
            key: key.clone(),
            key_hash: hash_token(raw_key.expose_secret()),
        });
        CreatedApiKey { key, raw_key }
    }

    /// Opens a session for the user and returns its id.
    pub fn create_session(&self, user_id: i64) -> String {
        let session_id = generate_token(self.inner.config.token_length);
        self.state_mut().sessions.insert(session_id.clone(), user_id);
        session_id
    }

    /// Marks the caller identity used by [`TeamApi::create_team`].
    pub fn sign_in(&self, user_id: i64) {
        self.state_mut().current_user = Some(user_id);
    }

    // Inspection helpers for assertions.

    pub fn invitation(&self, invitation_id: i64) -> Option<Invitation> {
        self.state()
            .invitations
            .iter()
            .find(|s| s.invitation.id == invitation_id)
            .map(|s| s.invitation.clone())
    }

    pub fn resend_count(&self, invitation_id: i64) -> u32 {
        self.state()
            .invitations
            .iter()
            .find(|s| s.invitation.id == invitation_id)
            .map_or(0, |s| s.resend_count)
    }

    pub fn membership(&self, team_id: i64, user_id: i64) -> Option<TeamMember> {
        self.state()
            .members
            .iter()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
            .cloned()
    }

    fn state(&self) -> RwLockReadGuard<'_, BackendState> {
        self.inner.state.read().expect("state lock poisoned")
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, BackendState> {
        self.inner.state.write().expect("state lock poisoned")
    }
}

fn team_with_relations(state: &BackendState, team: &Team) -> TeamWithRelations {
    TeamWithRelations {
        team: team.clone(),
        members: state
            .members
            .iter()
            .filter(|m| m.team_id == team.id)
            .cloned()
            .collect(),
        invitations: state
            .invitations
            .iter()
            .filter(|s| s.invitation.team_id == team.id && s.invitation.accepted_at.is_none())
            .map(|s| s.invitation.clone())
            .collect(),
    }
}

#[async_trait]
impl TeamApi for MockBackend {
    async fn create_team(&self, name: &str) -> Result<Team, TeamError> {
        validate_name(name)?;

        let mut state = self.write()?;
        let team = Team {
            id: self.next_id(),
            name: name.to_owned(),
        };
        state.teams.push(team.clone());

        // The authenticated caller becomes the owner.
        if let Some(user_id) = state.current_user {
            if let Some(user) = state.users.iter().find(|u| u.id == user_id).cloned() {
                let member = TeamMember {
                    id: self.next_id(),
                    team_id: team.id,
                    user_id,
                    role: TeamRole::Owner,
                    created_at: Utc::now(),
                    user,
                };
                state.members.push(member);
            }
        }

        log::info!(target: "roster", "msg=\"team created\", team_id={}", team.id);
        Ok(team)
    }

    async fn get_team(&self, team_id: i64) -> Result<TeamWithRelations, TeamError> {
        let state = self.read()?;
        let team = state
            .teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or(TeamError::NotFound)?;
        Ok(team_with_relations(&state, team))
    }

    async fn rename_team(&self, team_id: i64, name: &str) -> Result<Team, TeamError> {
        validate_name(name)?;

        let mut state = self.write()?;
        let team = state
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(TeamError::NotFound)?;
        name.clone_into(&mut team.name);
        Ok(team.clone())
    }

    async fn delete_team(&self, team_id: i64) -> Result<(), TeamError> {
        let mut state = self.write()?;
        if !state.teams.iter().any(|t| t.id == team_id) {
            return Err(TeamError::NotFound);
        }

        state.teams.retain(|t| t.id != team_id);
        state.members.retain(|m| m.team_id != team_id);
        state
            .invitations
            .retain(|s| s.invitation.team_id != team_id);
        state.api_keys.retain(|k| k.key.team_id != team_id);

        log::info!(target: "roster", "msg=\"team deleted\", team_id={team_id}");
        Ok(())
    }

    async fn update_member_role(
        &self,
        member_id: i64,
        role: TeamRole,
    ) -> Result<TeamMember, TeamError> {
        if role == TeamRole::Owner {
            return Err(TeamError::Conflict(
                "a team has exactly one owner; transfer ownership instead".to_owned(),
            ));
        }

        let mut state = self.write()?;
        let member = state
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or(TeamError::NotFound)?;
        if member.role == TeamRole::Owner {
            return Err(TeamError::Conflict(
                "the team owner's role cannot be changed".to_owned(),
            ));
        }

        member.role = role;
        Ok(member.clone())
    }

    async fn remove_member(&self, member_id: i64) -> Result<(), TeamError> {
        let mut state = self.write()?;
        let member = state
            .members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or(TeamError::NotFound)?;
        if member.role == TeamRole::Owner {
            return Err(TeamError::Conflict(
                "cannot remove the team owner".to_owned(),
            ));
        }

        state.members.retain(|m| m.id != member_id);
        Ok(())
    }

    async fn invite_member(
        &self,
        team_id: i64,
        email: &str,
        role: TeamRole,
    ) -> Result<InviteOutcome, TeamError> {
        if role == TeamRole::Owner {
            return Err(TeamError::Validation(
                "invitations may carry the ADMIN or MEMBER role only".to_owned(),
            ));
        }

        let mut state = self.write()?;
        if !state.teams.iter().any(|t| t.id == team_id) {
            return Err(TeamError::NotFound);
        }

        let already_member = state
            .members
            .iter()
            .any(|m| m.team_id == team_id && m.user.email.eq_ignore_ascii_case(email));
        if already_member {
            return Err(TeamError::Conflict(
                "user is already a member of this team".to_owned(),
            ));
        }

        // An existing account is added directly; anyone else gets a
        // share link carrying a single-use token.
        if let Some(user) = state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
        {
            let member = TeamMember {
                id: self.next_id(),
                team_id,
                user_id: user.id,
                role,
                created_at: Utc::now(),
                user,
            };
            state.members.push(member);
            log::info!(
                target: "roster",
                "msg=\"existing user added to team\", team_id={team_id}"
            );
            return Ok(InviteOutcome::MemberAdded);
        }

        let token = generate_token(self.inner.config.token_length);
        let invitation = Invitation {
            id: self.next_id(),
            team_id,
            email: email.to_owned(),
            role,
            token_hash: hash_token(&token),
            expires_at: Utc::now() + self.inner.config.invitation_expiry,
            accepted_at: None,
            created_at: Utc::now(),
        };
        log::info!(
            target: "roster",
            "msg=\"invitation created\", team_id={}, invitation_id={}, email=\"{}\"",
            invitation.team_id,
            invitation.id,
            invitation.email
        );
        state.invitations.push(StoredInvitation {
            invitation,
            resend_count: 0,
        });

        Ok(InviteOutcome::ShareLink(format!("/invite/{token}")))
    }

    async fn revoke_invitation(&self, invitation_id: i64) -> Result<(), TeamError> {
        let mut state = self.write()?;
        if !state
            .invitations
            .iter()
            .any(|s| s.invitation.id == invitation_id)
        {
            return Err(TeamError::NotFound);
        }

        state
            .invitations
            .retain(|s| s.invitation.id != invitation_id);
        log::info!(
            target: "roster",
            "msg=\"invitation revoked\", invitation_id={invitation_id}"
        );
        Ok(())
    }

    async fn resend_invitation(&self, invitation_id: i64) -> Result<(), TeamError> {
        let mut state = self.write()?;
        let stored = state
            .invitations
            .iter_mut()
            .find(|s| s.invitation.id == invitation_id)
            .ok_or(TeamError::NotFound)?;

        // Re-issues the notification for the same token; state and expiry
        // are left untouched.
        stored.resend_count += 1;
        log::info!(
            target: "roster",
            "msg=\"invitation resent\", invitation_id={invitation_id}"
        );
        Ok(())
    }

    async fn lookup_invitation(&self, token: &SecretString) -> Result<Invitation, TeamError> {
        let token_hash = hash_token(token.expose_secret());
        let state = self.read()?;
        state
            .invitations
            .iter()
            .map(|s| &s.invitation)
            // An accepted token is spent; it reads as not-found.
            .find(|i| i.token_hash == token_hash && i.accepted_at.is_none())
            .cloned()
            .ok_or(TeamError::NotFound)
    }

    async fn accept_invitation(
        &self,
        token: &SecretString,
        user_id: i64,
    ) -> Result<TeamMember, TeamError> {
        let token_hash = hash_token(token.expose_secret());
        let mut state = self.write()?;

        let invitation = state
            .invitations
            .iter()
            .map(|s| &s.invitation)
            .find(|i| i.token_hash == token_hash)
            .cloned()
            .ok_or(TeamError::NotFound)?;

        let user = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(TeamError::NotFound)?;

        if invitation.email != user.email {
            return Err(TeamError::Conflict(
                "this invitation is for a different email address".to_owned(),
            ));
        }
        if invitation.is_expired() {
            return Err(TeamError::InvitationExpired);
        }
        if invitation.is_accepted() {
            return Err(TeamError::Conflict(
                "invitation has already been accepted".to_owned(),
            ));
        }
        if state
            .members
            .iter()
            .any(|m| m.team_id == invitation.team_id && m.user_id == user_id)
        {
            return Err(TeamError::Conflict(
                "user is already a member of this team".to_owned(),
            ));
        }

        let member = TeamMember {
            id: self.next_id(),
            team_id: invitation.team_id,
            user_id,
            role: invitation.role,
            created_at: Utc::now(),
            user,
        };
        state.members.push(member.clone());

        if let Some(stored) = state
            .invitations
            .iter_mut()
            .find(|s| s.invitation.id == invitation.id)
        {
            stored.invitation.accepted_at = Some(Utc::now());
        }

        log::info!(
            target: "roster",
            "msg=\"invitation accepted\", team_id={}, user_id={}, member_id={}",
            member.team_id,
            member.user_id,
            member.id
        );
        Ok(member)
    }

    async fn create_api_key(&self, team_id: i64, name: &str) -> Result<CreatedApiKey, TeamError> {
        validate_name(name)?;

        let mut state = self.write()?;
        if !state.teams.iter().any(|t| t.id == team_id) {
            return Err(TeamError::NotFound);
        }

        let raw_key = mint_service_key(self.inner.config.token_length);
        let key = TeamApiKey {
            id: self.next_id(),
            team_id,
            name: name.to_owned(),
            last_used_at: None,
            created_at: Utc::now(),
        };
        state.api_keys.push(StoredKey {
            key: key.clone(),
            key_hash: hash_token(raw_key.expose_secret()),
        });

        log::info!(
            target: "roster",
            "msg=\"service key minted\", team_id={team_id}, name=\"{name}\""
        );
        Ok(CreatedApiKey { key, raw_key })
    }

    async fn list_api_keys(&self, team_id: i64) -> Result<Vec<TeamApiKey>, TeamError> {
        let state = self.read()?;
        let mut keys: Vec<TeamApiKey> = state
            .api_keys
            .iter()
            .filter(|k| k.key.team_id == team_id)
            .map(|k| k.key.clone())
            .collect();
        keys.reverse(); // newest first
        Ok(keys)
    }

    async fn revoke_api_key(&self, key_id: i64) -> Result<(), TeamError> {
        let mut state = self.write()?;
        if !state.api_keys.iter().any(|k| k.key.id == key_id) {
            return Err(TeamError::NotFound);
        }

        state.api_keys.retain(|k| k.key.id != key_id);
        log::info!(target: "roster", "msg=\"service key revoked\", key_id={key_id}");
        Ok(())
    }
}

#[async_trait]
impl ApiKeyValidator for MockBackend {
    async fn validate_key(&self, raw_key: &str) -> Result<Option<Team>, TeamError> {
        let key_hash = hash_token(raw_key);
        let mut state = self.write()?;

        let Some(stored) = state.api_keys.iter_mut().find(|k| k.key_hash == key_hash) else {
            return Ok(None);
        };
        stored.key.last_used_at = Some(Utc::now());
        let team_id = stored.key.team_id;

        Ok(state.teams.iter().find(|t| t.id == team_id).cloned())
    }
}

#[async_trait]
impl SessionProvider for MockBackend {
    async fn user_for_session(&self, session_id: &str) -> Result<Option<User>, TeamError> {
        let state = self.read()?;
        let Some(user_id) = state.sessions.get(session_id) else {
            return Ok(None);
        };
        Ok(state.users.iter().find(|u| u.id == *user_id).cloned())
    }
}

#[async_trait]
impl TeamDirectory for MockBackend {
    async fn teams_for_email(&self, email: &str) -> Result<Vec<TeamWithRelations>, TeamError> {
        let state = self.read()?;
        Ok(state
            .teams
            .iter()
            .filter(|team| {
                state
                    .members
                    .iter()
                    .any(|m| m.team_id == team.id && m.user.email == email)
            })
            .map(|team| team_with_relations(&state, team))
            .collect())
    }
}

/// Records navigation effects for assertions.
#[derive(Clone, Default)]
pub struct MockNavigator {
    inner: Arc<NavState>,
}

#[derive(Default)]
struct NavState {
    refreshes: AtomicUsize,
    location: RwLock<Option<String>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many refreshes components requested.
    pub fn refresh_count(&self) -> usize {
        self.inner.refreshes.load(Ordering::SeqCst)
    }

    /// The last path navigated to, if any.
    pub fn location(&self) -> Option<String> {
        self.inner.location.read().expect("lock poisoned").clone()
    }
}

impl Navigator for MockNavigator {
    fn refresh(&self) {
        self.inner.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn goto(&self, path: &str) {
        *self.inner.location.write().expect("lock poisoned") = Some(path.to_owned());
    }
}

/// Simple in-memory [`KeyValueStore`], standing in for the cookie jar.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.to_owned(), value.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_team_crud() {
        let backend = MockBackend::new();
        let user = backend.seed_user(Some("Owner"), "owner@example.com");
        backend.sign_in(user.id);

        let team = backend.create_team("Test Team").await.unwrap();
        assert_eq!(team.name, "Test Team");

        // The signed-in caller became the owner.
        let membership = backend.membership(team.id, user.id).unwrap();
        assert_eq!(membership.role, TeamRole::Owner);

        let renamed = backend.rename_team(team.id, "New Name").await.unwrap();
        assert_eq!(renamed.name, "New Name");

        backend.delete_team(team.id).await.unwrap();
        assert!(matches!(
            backend.get_team(team.id).await,
            Err(TeamError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_backend_protects_owner_row() {
        let backend = MockBackend::new();
        let owner = backend.seed_user(None, "owner@example.com");
        let team = backend.seed_team("Core");
        let membership = backend.seed_member(&team, &owner, TeamRole::Owner);

        assert!(matches!(
            backend.remove_member(membership.id).await,
            Err(TeamError::Conflict(_))
        ));
        assert!(matches!(
            backend
                .update_member_role(membership.id, TeamRole::Member)
                .await,
            Err(TeamError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_key_touches_last_used() {
        let backend = MockBackend::new();
        let team = backend.seed_team("Core");
        let created = backend.seed_api_key(&team, "CI Key");
        assert!(created.key.last_used_at.is_none());

        let resolved = backend
            .validate_key(created.raw_key.expose_secret())
            .await
            .unwrap();
        assert_eq!(resolved.unwrap().id, team.id);

        let keys = backend.list_api_keys(team.id).await.unwrap();
        assert!(keys[0].last_used_at.is_some());
    }
}
