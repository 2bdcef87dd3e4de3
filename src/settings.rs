//! Team settings panel: profile, members, invitations, danger zone.
//!
//! The panel is a view-model over the server-shaped team payload plus the
//! viewer's email. Visibility of every control comes from [`crate::policy`];
//! each mutation re-checks its gate, proposes the change to the remote API,
//! and requests a refresh; the server remains the authority.

use crate::client::{Navigator, TeamApi};
use crate::confirm::ConfirmDeletionGate;
use crate::policy::{self, MemberAction};
use crate::types::{Invitation, TeamMember, TeamRole, TeamWithRelations};
use crate::validators::validate_name;
use crate::TeamError;

pub struct TeamSettingsPanel<A, N> {
    api: A,
    nav: N,
    team: TeamWithRelations,
    viewer_email: String,
    error: Option<String>,
    pending: bool,
}

impl<A: TeamApi, N: Navigator> TeamSettingsPanel<A, N> {
    pub fn new(api: A, nav: N, team: TeamWithRelations, viewer_email: impl Into<String>) -> Self {
        Self {
            api,
            nav,
            team,
            viewer_email: viewer_email.into(),
            error: None,
            pending: false,
        }
    }

    pub fn team(&self) -> &TeamWithRelations {
        &self.team
    }

    /// The viewer's membership row, if they belong to this team.
    pub fn viewer(&self) -> Option<&TeamMember> {
        self.team.member_by_email(&self.viewer_email)
    }

    pub fn viewer_role(&self) -> Option<TeamRole> {
        self.viewer().map(|m| m.role)
    }

    /// Inline error text from the last failed action, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Controls are disabled while a request is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    // Display gates. The rename input is rendered disabled when this is
    // false; the danger zone and delete control are hidden entirely.

    pub fn can_rename(&self) -> bool {
        self.viewer_role().is_some_and(policy::can_rename_team)
    }

    pub fn shows_danger_zone(&self) -> bool {
        self.viewer_role().is_some_and(policy::can_view_danger_zone)
    }

    pub fn shows_delete_control(&self) -> bool {
        self.viewer_role().is_some_and(policy::can_delete_team)
    }

    pub fn can_invite(&self) -> bool {
        self.viewer_role().is_some_and(policy::can_manage_invitations)
    }

    /// Member rows sorted Owner first, then Admin, then Member.
    pub fn members(&self) -> Vec<&TeamMember> {
        let mut members: Vec<&TeamMember> = self.team.members.iter().collect();
        members.sort_by_key(|m| m.role.sort_priority());
        members
    }

    /// The actions the viewer may see on one member row.
    pub fn member_actions(&self, member: &TeamMember) -> Vec<MemberAction> {
        let Some(viewer) = self.viewer() else {
            return Vec::new();
        };
        let is_self = viewer.user_id == member.user_id;
        [
            MemberAction::Promote,
            MemberAction::Demote,
            MemberAction::Remove,
            MemberAction::Leave,
        ]
        .into_iter()
        .filter(|&action| policy::can_perform(viewer.role, action, member.role, is_self))
        .collect()
    }

    pub fn pending_invitations(&self) -> &[Invitation] {
        &self.team.invitations
    }

    /// Renames the team. Admin or Owner only; the input is disabled for
    /// other roles, and the gate is re-checked here anyway.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "rename_team", skip_all))]
    pub async fn rename(&mut self, name: &str) {
        if self.pending {
            return;
        }
        self.error = None;

        if !self.can_rename() {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }
        if let Err(err) = validate_name(name) {
            self.error = Some(err.to_string());
            return;
        }

        self.pending = true;
        let result = self.api.rename_team(self.team.team.id, name).await;
        self.pending = false;

        match result {
            Ok(_) => self.nav.refresh(),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Promotes or demotes a member. Owner-only, never against the
    /// viewer's own row; only Admin and Member are assignable.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "change_role", skip_all))]
    pub async fn change_role(&mut self, member_id: i64, new_role: TeamRole) {
        if self.pending {
            return;
        }
        self.error = None;

        if new_role == TeamRole::Owner {
            self.error = Some(
                TeamError::Validation("the owner role cannot be assigned".to_owned()).to_string(),
            );
            return;
        }

        let Some(member) = self.team.members.iter().find(|m| m.id == member_id) else {
            self.error = Some(TeamError::NotFound.to_string());
            return;
        };
        let action = match new_role {
            TeamRole::Admin => MemberAction::Promote,
            _ => MemberAction::Demote,
        };
        if !self.allows(action, member) {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }

        self.pending = true;
        let result = self.api.update_member_role(member_id, new_role).await;
        self.pending = false;

        match result {
            Ok(_) => self.nav.refresh(),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Removes another member from the team.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "remove_member", skip_all))]
    pub async fn remove_member(&mut self, member_id: i64) {
        if self.pending {
            return;
        }
        self.error = None;

        let Some(member) = self.team.members.iter().find(|m| m.id == member_id) else {
            self.error = Some(TeamError::NotFound.to_string());
            return;
        };
        if !self.allows(MemberAction::Remove, member) {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }

        self.pending = true;
        let result = self.api.remove_member(member_id).await;
        self.pending = false;

        match result {
            Ok(()) => self.nav.refresh(),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// The viewer leaves the team: their own row, same deletion endpoint
    /// as [`Self::remove_member`], but a distinct affordance.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "leave_team", skip_all))]
    pub async fn leave(&mut self) {
        if self.pending {
            return;
        }
        self.error = None;

        let Some(viewer) = self.viewer() else {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        };
        let member_id = viewer.id;

        self.pending = true;
        let result = self.api.remove_member(member_id).await;
        self.pending = false;

        match result {
            Ok(()) => self.nav.refresh(),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "revoke_invitation", skip_all))]
    pub async fn revoke_invitation(&mut self, invitation_id: i64) {
        if self.pending {
            return;
        }
        self.error = None;

        if !self.can_invite() {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }

        self.pending = true;
        let result = self.api.revoke_invitation(invitation_id).await;
        self.pending = false;

        match result {
            Ok(()) => self.nav.refresh(),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Re-sends the invitation notification. No refresh: the server leaves
    /// state and expiry untouched, so there is nothing new to fetch.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "resend_invitation", skip_all))]
    pub async fn resend_invitation(&mut self, invitation_id: i64) {
        if self.pending {
            return;
        }
        self.error = None;

        if !self.can_invite() {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }

        self.pending = true;
        let result = self.api.resend_invitation(invitation_id).await;
        self.pending = false;

        if let Err(err) = result {
            self.error = Some(err.to_string());
        }
    }

    /// Deletes the team. Owner-only, and the confirmation gate must hold
    /// the exact team name before the call is issued. Navigates home on
    /// success.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "delete_team", skip_all))]
    pub async fn delete_team(&mut self, gate: &mut ConfirmDeletionGate) {
        if self.pending {
            return;
        }
        self.error = None;

        if !self.shows_delete_control() {
            self.error = Some(TeamError::Forbidden.to_string());
            return;
        }
        if !gate.begin() {
            return;
        }

        self.pending = true;
        let result = self.api.delete_team(self.team.team.id).await;
        self.pending = false;
        gate.finish();

        match result {
            Ok(()) => self.nav.goto("/"),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn allows(&self, action: MemberAction, member: &TeamMember) -> bool {
        self.viewer().is_some_and(|viewer| {
            policy::can_perform(
                viewer.role,
                action,
                member.role,
                viewer.user_id == member.user_id,
            )
        })
    }
}
