//! Seams to the surrounding application.
//!
//! [`TeamApi`] is the remote surface this module consumes but does not
//! define: the server behind it owns all entities and re-validates every
//! mutation. [`Navigator`] carries the two navigation effects a component
//! may request after a mutation: re-fetching the current view, or moving
//! to another path.

use async_trait::async_trait;

use crate::types::{CreatedApiKey, Invitation, Team, TeamApiKey, TeamMember, TeamRole, TeamWithRelations};
use crate::{SecretString, TeamError};

/// Outcome of submitting an invitation.
#[derive(Debug, Clone, PartialEq)]
pub enum InviteOutcome {
    /// The email has no account yet; the invitee joins through this link.
    ShareLink(String),
    /// The email belongs to an existing user who was added directly.
    MemberAdded,
}

/// The remote team API.
///
/// Each mutating call is a single in-flight request per user gesture;
/// callers disable their controls while one is pending.
#[async_trait]
pub trait TeamApi: Send + Sync {
    async fn create_team(&self, name: &str) -> Result<Team, TeamError>;
    async fn get_team(&self, team_id: i64) -> Result<TeamWithRelations, TeamError>;
    async fn rename_team(&self, team_id: i64, name: &str) -> Result<Team, TeamError>;
    async fn delete_team(&self, team_id: i64) -> Result<(), TeamError>;

    async fn update_member_role(
        &self,
        member_id: i64,
        role: TeamRole,
    ) -> Result<TeamMember, TeamError>;
    async fn remove_member(&self, member_id: i64) -> Result<(), TeamError>;

    /// Invites `email` to the team. Fails with [`TeamError::Conflict`] when
    /// the email already belongs to a member.
    async fn invite_member(
        &self,
        team_id: i64,
        email: &str,
        role: TeamRole,
    ) -> Result<InviteOutcome, TeamError>;
    async fn revoke_invitation(&self, invitation_id: i64) -> Result<(), TeamError>;
    /// Re-issues the notification for the same token. State and expiry are
    /// left untouched.
    async fn resend_invitation(&self, invitation_id: i64) -> Result<(), TeamError>;

    /// Looks an invitation up by its raw token, for the landing page.
    /// Expired invitations are returned so the page can render an expired
    /// state distinct from not-found.
    async fn lookup_invitation(&self, token: &SecretString) -> Result<Invitation, TeamError>;
    async fn accept_invitation(
        &self,
        token: &SecretString,
        user_id: i64,
    ) -> Result<TeamMember, TeamError>;

    /// Mints a service key; the raw secret in the result is shown once and
    /// never retrievable afterwards.
    async fn create_api_key(&self, team_id: i64, name: &str) -> Result<CreatedApiKey, TeamError>;
    async fn list_api_keys(&self, team_id: i64) -> Result<Vec<TeamApiKey>, TeamError>;
    async fn revoke_api_key(&self, key_id: i64) -> Result<(), TeamError>;
}

/// Navigation effects requested by components after mutations.
pub trait Navigator: Send + Sync {
    /// Re-fetch authoritative state for the current view.
    fn refresh(&self);
    /// Navigate to an application path, e.g. `/` after deleting a team.
    fn goto(&self, path: &str);
}
