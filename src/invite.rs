//! Invite-member dialog and the invitation landing page.

use crate::client::{InviteOutcome, Navigator, TeamApi};
use crate::types::{Invitation, TeamRole};
use crate::validators::validate_email;
use crate::{SecretString, TeamError};

/// What the dialog is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum InviteView {
    Form,
    /// The invite went to a new user; the shareable link stays on screen
    /// until the dialog is dismissed.
    ShareLink(String),
}

/// View-model for the invite-member dialog.
///
/// Validation failures block submission without a network call. Remote
/// failures surface inline and leave the form populated for retry.
pub struct InviteMemberDialog<A, N> {
    api: A,
    nav: N,
    team_id: i64,
    email: String,
    role: TeamRole,
    view: InviteView,
    error: Option<String>,
    open: bool,
    pending: bool,
    link_issued: bool,
}

impl<A: TeamApi, N: Navigator> InviteMemberDialog<A, N> {
    pub fn new(api: A, nav: N, team_id: i64) -> Self {
        Self {
            api,
            nav,
            team_id,
            email: String::new(),
            role: TeamRole::Member,
            view: InviteView::Form,
            error: None,
            open: false,
            pending: false,
            link_issued: false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_email(&mut self, email: &str) {
        email.clone_into(&mut self.email);
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_role(&mut self, role: TeamRole) {
        self.role = role;
    }

    pub fn view(&self) -> &InviteView {
        &self.view
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits the form. A share link keeps the dialog open; a direct add
    /// closes it and refreshes the view.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "invite_submit", skip_all))]
    pub async fn submit(&mut self) {
        if self.pending {
            return;
        }
        self.error = None;

        if let Err(err) = validate_email(&self.email) {
            // Blocks submission; no network call is made.
            self.error = Some(err.to_string());
            return;
        }

        self.pending = true;
        let result = self
            .api
            .invite_member(self.team_id, &self.email, self.role)
            .await;
        self.pending = false;

        match result {
            Ok(InviteOutcome::ShareLink(url)) => {
                self.link_issued = true;
                self.view = InviteView::ShareLink(url);
            }
            Ok(InviteOutcome::MemberAdded) => {
                self.open = false;
                self.nav.refresh();
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
    }

    /// Dismisses the dialog. If a share link was issued this session, the
    /// underlying view refreshes so the new pending invitation shows up.
    pub fn close(&mut self) {
        self.open = false;
        if self.link_issued {
            self.nav.refresh();
        }
        self.reset();
    }

    /// Clears the form for another invite without closing.
    pub fn reset(&mut self) {
        self.email.clear();
        self.error = None;
        self.view = InviteView::Form;
        self.link_issued = false;
    }
}

/// What the `/invite/:token` landing page renders.
#[derive(Debug, Clone)]
pub enum InviteLanding {
    Valid(Invitation),
    /// Known token whose expiry is in the past, distinct from not-found.
    Expired(Invitation),
    NotFound,
}

/// Resolves a raw invitation token to its landing view.
pub async fn load_invite_landing<A: TeamApi>(
    api: &A,
    token: &SecretString,
) -> Result<InviteLanding, TeamError> {
    match api.lookup_invitation(token).await {
        Ok(invitation) if invitation.is_expired() => Ok(InviteLanding::Expired(invitation)),
        Ok(invitation) => Ok(InviteLanding::Valid(invitation)),
        Err(TeamError::NotFound) => Ok(InviteLanding::NotFound),
        Err(err) => Err(err),
    }
}
