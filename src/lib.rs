//! Team management for multi-tenant web applications.
//!
//! `roster` is the client-side core of a team surface: switching between
//! teams, membership and roles, invitations, and team-scoped service keys.
//! It renders nothing itself. View-models hold server-shaped data, decide
//! which actions are visible through [`policy`], and propose every change
//! to the remote API behind the [`client::TeamApi`] seam; the server is
//! the sole authority over the entities in [`types`].
//!
//! The [`access`] module resolves the acting identity for an inbound
//! request (signed session cookie or `Bearer ne_team_...` service key) and
//! attaches the caller's team list to the request context.

pub mod access;
pub mod client;
pub mod config;
pub mod confirm;
pub mod crypto;
pub mod invite;
pub mod keys;
pub mod policy;
pub mod secret;
pub mod settings;
pub mod state;
pub mod switcher;
pub mod types;
pub mod validators;

#[cfg(feature = "mocks")]
pub mod mocks;

pub use secret::SecretString;
pub use types::{
    Actor, CreatedApiKey, Invitation, InvitationStatus, Team, TeamApiKey, TeamMember, TeamRole,
    TeamWithRelations, User,
};

use std::fmt;

/// Errors surfaced by the team surface and its seams.
///
/// Remote-call failures are always caught at the call site and shown as
/// inline text; none of them are allowed to crash a view.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamError {
    /// Client-side validation failed; no network call was made.
    Validation(String),
    /// The requested change conflicts with current server state.
    Conflict(String),
    /// The acting identity lacks the role required for this action.
    Forbidden,
    /// The entity (team, member, invitation, key) does not exist.
    NotFound,
    /// The invitation's expiry timestamp is in the past.
    InvitationExpired,
    /// The remote call itself failed (transport or server fault).
    Remote(String),
    Internal(String),
}

impl std::error::Error for TeamError {}

impl fmt::Display for TeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamError::Validation(msg) => write!(f, "{msg}"),
            TeamError::Conflict(msg) => write!(f, "{msg}"),
            TeamError::Forbidden => write!(f, "You do not have permission to perform this action"),
            TeamError::NotFound => write!(f, "Not found"),
            TeamError::InvitationExpired => write!(f, "This invitation has expired"),
            TeamError::Remote(msg) => write!(f, "Request failed: {msg}"),
            TeamError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}
