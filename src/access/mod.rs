//! Request access resolution: who is calling, and which teams they see.
//!
//! Resolution order is fixed: a `Bearer ne_team_...` service key wins when
//! it validates; an unrecognized key silently falls through to the session
//! path rather than rejecting the request (inherited behavior: layered
//! auth, not an error). A session user gets their team list, with nested
//! member and invitation detail, attached to the request context. When
//! neither resolves, the actor is absent and downstream authorization must
//! deny privileged operations.

mod cookie;

#[cfg(feature = "axum")]
pub mod axum;

pub use cookie::{sign_session_id, verify_signed_cookie};

use async_trait::async_trait;

use crate::crypto::SERVICE_KEY_PREFIX;
use crate::types::{Actor, Team, TeamWithRelations, User};
use crate::TeamError;

/// Validates raw service keys against the key store.
#[async_trait]
pub trait ApiKeyValidator: Send + Sync {
    /// Resolves a raw key to its team, touching `last_used_at` on success.
    /// An unrecognized key is `Ok(None)`, not an error.
    async fn validate_key(&self, raw_key: &str) -> Result<Option<Team>, TeamError>;
}

/// Resolves the current user from a session id.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn user_for_session(&self, session_id: &str) -> Result<Option<User>, TeamError>;
}

/// Lists the teams a user belongs to, members and invitations included.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn teams_for_email(&self, email: &str) -> Result<Vec<TeamWithRelations>, TeamError>;
}

/// Per-request context produced by [`resolve_actor`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub actor: Option<Actor>,
    /// The viewer's teams; populated only for user actors.
    pub teams: Vec<TeamWithRelations>,
}

impl RequestContext {
    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }
}

/// Extracts the raw service key from an `Authorization` header value, if
/// the header carries one. Non-service bearer tokens are ignored.
pub fn bearer_service_key(header: &str) -> Option<&str> {
    let raw = header.strip_prefix("Bearer ")?;
    raw.starts_with(SERVICE_KEY_PREFIX).then_some(raw)
}

/// Resolves exactly one actor for an inbound request.
pub async fn resolve_actor<K, D>(
    authorization: Option<&str>,
    session_user: Option<User>,
    keys: &K,
    directory: &D,
) -> Result<RequestContext, TeamError>
where
    K: ApiKeyValidator,
    D: TeamDirectory,
{
    if let Some(raw_key) = authorization.and_then(bearer_service_key) {
        match keys.validate_key(raw_key).await? {
            Some(team) => {
                log::info!(
                    target: "roster",
                    "msg=\"service key authenticated\", team_id={}",
                    team.id
                );
                return Ok(RequestContext {
                    actor: Some(Actor::Team { team_id: team.id }),
                    teams: Vec::new(),
                });
            }
            None => {
                // Unrecognized keys fall through to session resolution.
                log::debug!(
                    target: "roster",
                    "msg=\"service key rejected, falling back to session\""
                );
            }
        }
    }

    let Some(user) = session_user else {
        return Ok(RequestContext::default());
    };

    let teams = directory.teams_for_email(&user.email).await?;
    log::debug!(
        target: "roster",
        "msg=\"session actor resolved\", user_id={}, teams={}",
        user.id,
        teams.len()
    );

    Ok(RequestContext {
        actor: Some(Actor::User(user)),
        teams,
    })
}
