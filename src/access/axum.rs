//! Axum integration: resolves a [`RequestContext`] per request.
//!
//! [`RequestContext`] extracts on every route without rejecting
//! unauthenticated requests: an absent actor is a valid resolution, and
//! downstream handlers decide what anonymous callers may do. Extraction
//! only fails when a collaborator itself fails.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use super::cookie::verify_signed_cookie;
use super::{resolve_actor, ApiKeyValidator, RequestContext, SessionProvider, TeamDirectory};
use crate::types::User;
use crate::{SecretString, TeamError};

/// Shared state for the access extractor.
#[derive(Clone)]
pub struct AccessState<K, S, D> {
    pub key_validator: K,
    pub sessions: S,
    pub directory: D,
    /// Secret used to verify the signed session cookie.
    pub cookie_secret: SecretString,
    /// Name of the session cookie, normally `"session"`.
    pub session_cookie: &'static str,
}

impl<K, S, D> FromRequestParts<AccessState<K, S, D>> for RequestContext
where
    K: ApiKeyValidator + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
    D: TeamDirectory + Clone + Send + Sync + 'static,
{
    type Rejection = AccessFailure;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AccessState<K, S, D>,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let session_user = resolve_session_user(&parts.headers, state).await?;

        resolve_actor(
            authorization,
            session_user,
            &state.key_validator,
            &state.directory,
        )
        .await
        .map_err(AccessFailure)
    }
}

async fn resolve_session_user<K, S, D>(
    headers: &HeaderMap,
    state: &AccessState<K, S, D>,
) -> Result<Option<User>, AccessFailure>
where
    S: SessionProvider,
{
    let Some(session_id) = cookie_value(headers, state.session_cookie)
        .and_then(|value| verify_signed_cookie(&value, &state.cookie_secret))
    else {
        return Ok(None);
    };

    state
        .sessions
        .user_for_session(&session_id)
        .await
        .map_err(AccessFailure)
}

/// Reads one cookie out of the `Cookie` request header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .map(ToOwned::to_owned)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Converts [`TeamError`] into an HTTP response.
#[derive(Debug)]
pub struct AccessFailure(pub TeamError);

impl From<TeamError> for AccessFailure {
    fn from(err: TeamError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AccessFailure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TeamError::Validation(_) => StatusCode::BAD_REQUEST,
            TeamError::Conflict(_) => StatusCode::CONFLICT,
            TeamError::Forbidden => StatusCode::FORBIDDEN,
            TeamError::NotFound => StatusCode::NOT_FOUND,
            TeamError::InvitationExpired => StatusCode::GONE,
            TeamError::Remote(_) | TeamError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
