//! Actor resolution: service keys, sessions, and the silent fallthrough.
//!
//! Run with: `cargo test --features mocks --test e2e_access`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};

use roster::access::resolve_actor;
use roster::mocks::MockBackend;
use roster::{Actor, Team, TeamRole, User};

fn seed_user_with_team(backend: &MockBackend) -> (User, Team) {
    let user = backend.seed_user(Some("Olivia"), "owner@example.com");
    let team = backend.seed_team("Design Team");
    backend.seed_member(&team, &user, TeamRole::Owner);
    backend.seed_invitation(
        &team,
        "pending@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(7),
    );
    (user, team)
}

#[tokio::test]
async fn test_valid_service_key_resolves_team_actor() {
    let backend = MockBackend::new();
    let (_, team) = seed_user_with_team(&backend);
    let created = backend.seed_api_key(&team, "CI Key");

    let header = format!("Bearer {}", created.raw_key.expose_secret());
    let ctx = resolve_actor(Some(header.as_str()), None, &backend, &backend)
        .await
        .unwrap();

    let Some(Actor::Team { team_id }) = ctx.actor else {
        panic!("expected team actor");
    };
    assert_eq!(team_id, team.id);
    // Key actors do not get a team-list hydration.
    assert!(ctx.teams.is_empty());
}

#[tokio::test]
async fn test_unrecognized_key_falls_through_to_session() {
    let backend = MockBackend::new();
    let (user, team) = seed_user_with_team(&backend);

    // A syntactically valid but unknown key must not reject the request.
    let ctx = resolve_actor(
        Some("Bearer ne_team_notARealKey00000000"),
        Some(user.clone()),
        &backend,
        &backend,
    )
    .await
    .unwrap();

    let Some(Actor::User(resolved)) = ctx.actor else {
        panic!("expected session user after fallthrough");
    };
    assert_eq!(resolved.id, user.id);
    assert_eq!(ctx.teams.len(), 1);
    assert_eq!(ctx.teams[0].team.id, team.id);
}

#[tokio::test]
async fn test_unrecognized_key_without_session_is_anonymous() {
    let backend = MockBackend::new();
    seed_user_with_team(&backend);

    let ctx = resolve_actor(
        Some("Bearer ne_team_notARealKey00000000"),
        None,
        &backend,
        &backend,
    )
    .await
    .unwrap();

    assert!(!ctx.is_authenticated());
    assert!(ctx.teams.is_empty());
}

#[tokio::test]
async fn test_session_user_gets_teams_with_relations() {
    let backend = MockBackend::new();
    let (user, team) = seed_user_with_team(&backend);

    let ctx = resolve_actor(None, Some(user), &backend, &backend)
        .await
        .unwrap();

    assert!(ctx.is_authenticated());
    assert_eq!(ctx.teams.len(), 1);
    let attached = &ctx.teams[0];
    assert_eq!(attached.team.id, team.id);
    // Nested member and invitation detail rides along.
    assert_eq!(attached.members.len(), 1);
    assert_eq!(attached.invitations.len(), 1);
}

#[tokio::test]
async fn test_foreign_bearer_token_is_ignored() {
    let backend = MockBackend::new();
    let (user, _) = seed_user_with_team(&backend);

    // Bearer tokens without the service prefix belong to other layers;
    // they are not validated against the key store.
    let ctx = resolve_actor(
        Some("Bearer some-oauth-token"),
        Some(user.clone()),
        &backend,
        &backend,
    )
    .await
    .unwrap();

    assert!(matches!(ctx.actor, Some(Actor::User(_))));
}

#[tokio::test]
async fn test_no_credentials_resolves_to_no_actor() {
    let backend = MockBackend::new();
    seed_user_with_team(&backend);

    let ctx = resolve_actor(None, None, &backend, &backend).await.unwrap();
    assert!(ctx.actor.is_none());
}
