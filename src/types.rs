//! Server-shaped entities rendered by the team surface.
//!
//! Nothing here is mutated locally: every change is proposed to the remote
//! API, and the view re-fetches authoritative state afterwards. The only
//! exception is list splicing for instant feedback, documented where it
//! happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as embedded in membership rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Display name; falls back to the email in views when absent.
    pub name: Option<String>,
    pub email: String,
}

/// A named group entity owning members, invitations and service keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// Role of a member within a team.
///
/// Exactly one member per team holds `Owner`; the server enforces that
/// invariant, this layer only renders around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamRole {
    Owner,
    Admin,
    Member,
}

impl TeamRole {
    /// Wire form, as stored and transmitted by the server.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }

    /// Parse from the wire form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OWNER" => Some(Self::Owner),
            "ADMIN" => Some(Self::Admin),
            "MEMBER" => Some(Self::Member),
            _ => None,
        }
    }

    /// Human-readable label shown in role badges.
    pub fn label(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Member => "Member",
        }
    }

    /// Sort key for member lists: Owner first, then Admin, then Member.
    pub(crate) fn sort_priority(self) -> u8 {
        match self {
            Self::Owner => 0,
            Self::Admin => 1,
            Self::Member => 2,
        }
    }
}

/// Links a user to a team with a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub team_id: i64,
    pub user_id: i64,
    pub role: TeamRole,
    pub created_at: DateTime<Utc>,
    /// Embedded user detail as the server ships it.
    pub user: User,
}

/// A time-bounded, single-use offer of membership at a given role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: i64,
    pub team_id: i64,
    pub email: String,
    pub role: TeamRole,
    /// SHA-256 hash of the invitation token; the raw token is only ever
    /// part of the share link.
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Whether the expiry timestamp is in the past.
    ///
    /// Expiry is derived, never an explicit transition.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    /// Derived lifecycle state. Revocation deletes the invitation, so a
    /// revoked invitation is observed as absent rather than as a status.
    pub fn status(&self) -> InvitationStatus {
        if self.is_accepted() {
            InvitationStatus::Accepted
        } else if self.is_expired() {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }
}

/// Derived invitation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

/// A long-lived team-scoped credential for non-interactive callers.
///
/// The raw secret is not a field here: it exists only inside
/// [`CreatedApiKey`] at mint time and is never re-displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamApiKey {
    pub id: i64,
    pub team_id: i64,
    pub name: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Result of minting a service key: metadata plus the one-time raw secret.
#[derive(Debug, Clone)]
pub struct CreatedApiKey {
    pub key: TeamApiKey,
    pub raw_key: crate::SecretString,
}

/// The payload the access layer attaches per team: the team itself with
/// nested member and invitation detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamWithRelations {
    pub team: Team,
    pub members: Vec<TeamMember>,
    pub invitations: Vec<Invitation>,
}

impl TeamWithRelations {
    /// Finds the membership row for a viewer identified by email.
    pub fn member_by_email(&self, email: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.user.email == email)
    }
}

/// The resolved identity attached to a request. Constructed per-request by
/// the access layer; never persisted.
#[derive(Debug, Clone)]
pub enum Actor {
    User(User),
    Team { team_id: i64 },
}
