//! Invitation lifecycle: landing page states, acceptance, resend.
//!
//! Run with: `cargo test --features mocks --test e2e_invitations`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};

use roster::client::TeamApi;
use roster::invite::{load_invite_landing, InviteLanding};
use roster::mocks::{MockBackend, MockNavigator};
use roster::settings::TeamSettingsPanel;
use roster::{InvitationStatus, SecretString, Team, TeamError, TeamRole};

fn seed_owned_team(backend: &MockBackend) -> Team {
    let owner = backend.seed_user(Some("Olivia"), "owner@example.com");
    let team = backend.seed_team("Invite Team");
    backend.seed_member(&team, &owner, TeamRole::Owner);
    team
}

#[tokio::test]
async fn test_unknown_token_lands_on_not_found() {
    let backend = MockBackend::new();
    seed_owned_team(&backend);

    let landing = load_invite_landing(&backend, &SecretString::new("invalid-token-12345"))
        .await
        .unwrap();
    assert!(matches!(landing, InviteLanding::NotFound));
}

#[tokio::test]
async fn test_expired_token_is_distinct_from_not_found() {
    let backend = MockBackend::new();
    let team = seed_owned_team(&backend);
    let (invitation, token) = backend.seed_invitation(
        &team,
        "late@example.com",
        TeamRole::Member,
        Utc::now() - Duration::days(1),
    );
    assert_eq!(invitation.status(), InvitationStatus::Expired);

    let landing = load_invite_landing(&backend, &token).await.unwrap();
    let InviteLanding::Expired(found) = landing else {
        panic!("expected expired landing, got not-found or valid");
    };
    assert_eq!(found.id, invitation.id);
}

#[tokio::test]
async fn test_valid_token_lands_on_invitation() {
    let backend = MockBackend::new();
    let team = seed_owned_team(&backend);
    let (invitation, token) = backend.seed_invitation(
        &team,
        "fresh@example.com",
        TeamRole::Admin,
        Utc::now() + Duration::days(7),
    );

    let landing = load_invite_landing(&backend, &token).await.unwrap();
    let InviteLanding::Valid(found) = landing else {
        panic!("expected valid landing");
    };
    assert_eq!(found.id, invitation.id);
    assert_eq!(found.role, TeamRole::Admin);
}

#[tokio::test]
async fn test_accept_creates_membership_and_consumes_token() {
    let backend = MockBackend::new();
    let team = seed_owned_team(&backend);
    let invitee = backend.seed_user(Some("Ivy"), "ivy@example.com");
    let (_, token) = backend.seed_invitation(
        &team,
        "ivy@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(7),
    );

    let member = backend.accept_invitation(&token, invitee.id).await.unwrap();
    assert_eq!(member.team_id, team.id);
    assert_eq!(member.role, TeamRole::Member);
    assert!(backend.membership(team.id, invitee.id).is_some());

    // Single use: the token now reads as not-found.
    let landing = load_invite_landing(&backend, &token).await.unwrap();
    assert!(matches!(landing, InviteLanding::NotFound));
    assert!(matches!(
        backend.accept_invitation(&token, invitee.id).await,
        Err(TeamError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_accept_rejects_expired_token() {
    let backend = MockBackend::new();
    let team = seed_owned_team(&backend);
    let invitee = backend.seed_user(Some("Ivy"), "ivy@example.com");
    let (_, token) = backend.seed_invitation(
        &team,
        "ivy@example.com",
        TeamRole::Member,
        Utc::now() - Duration::hours(1),
    );

    assert!(matches!(
        backend.accept_invitation(&token, invitee.id).await,
        Err(TeamError::InvitationExpired)
    ));
    assert!(backend.membership(team.id, invitee.id).is_none());
}

#[tokio::test]
async fn test_accept_rejects_mismatched_email() {
    let backend = MockBackend::new();
    let team = seed_owned_team(&backend);
    let other = backend.seed_user(Some("Oscar"), "oscar@example.com");
    let (_, token) = backend.seed_invitation(
        &team,
        "ivy@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(7),
    );

    assert!(matches!(
        backend.accept_invitation(&token, other.id).await,
        Err(TeamError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_resend_does_not_touch_state_or_expiry() {
    let backend = MockBackend::new();
    let nav = MockNavigator::new();
    let team = seed_owned_team(&backend);
    let (invitation, _) = backend.seed_invitation(
        &team,
        "slow@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(2),
    );
    let original_expiry = invitation.expires_at;

    let data = backend.get_team(team.id).await.unwrap();
    let mut panel =
        TeamSettingsPanel::new(backend.clone(), nav.clone(), data, "owner@example.com");
    panel.resend_invitation(invitation.id).await;

    assert!(panel.error().is_none());
    assert_eq!(backend.resend_count(invitation.id), 1);

    // Same token, same window: resending re-notifies but never extends.
    let after = backend.invitation(invitation.id).unwrap();
    assert_eq!(after.expires_at, original_expiry);
    assert_eq!(after.status(), InvitationStatus::Pending);
    // Nothing changed server-side, so no refresh was requested.
    assert_eq!(nav.refresh_count(), 0);
}

#[tokio::test]
async fn test_revoke_deletes_invitation() {
    let backend = MockBackend::new();
    let nav = MockNavigator::new();
    let team = seed_owned_team(&backend);
    let (invitation, token) = backend.seed_invitation(
        &team,
        "gone@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(7),
    );

    let data = backend.get_team(team.id).await.unwrap();
    let mut panel =
        TeamSettingsPanel::new(backend.clone(), nav.clone(), data, "owner@example.com");
    panel.revoke_invitation(invitation.id).await;

    assert!(panel.error().is_none());
    assert_eq!(nav.refresh_count(), 1);

    // Revocation is terminal: the token reads as not-found afterwards.
    let landing = load_invite_landing(&backend, &token).await.unwrap();
    assert!(matches!(landing, InviteLanding::NotFound));
}

#[tokio::test]
async fn test_member_cannot_revoke_or_resend() {
    let backend = MockBackend::new();
    let nav = MockNavigator::new();
    let team = seed_owned_team(&backend);
    let member = backend.seed_user(Some("Mia"), "member@example.com");
    backend.seed_member(&team, &member, TeamRole::Member);
    let (invitation, _) = backend.seed_invitation(
        &team,
        "pending@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(7),
    );

    let data = backend.get_team(team.id).await.unwrap();
    let mut panel =
        TeamSettingsPanel::new(backend.clone(), nav.clone(), data, "member@example.com");

    panel.revoke_invitation(invitation.id).await;
    assert!(panel.error().is_some());
    assert!(backend.invitation(invitation.id).is_some());

    panel.resend_invitation(invitation.id).await;
    assert_eq!(backend.resend_count(invitation.id), 0);
}

#[tokio::test]
async fn test_settings_panel_marks_expired_invitations() {
    let backend = MockBackend::new();
    let team = seed_owned_team(&backend);
    backend.seed_invitation(
        &team,
        "late@example.com",
        TeamRole::Member,
        Utc::now() - Duration::days(1),
    );
    backend.seed_invitation(
        &team,
        "fresh@example.com",
        TeamRole::Member,
        Utc::now() + Duration::days(7),
    );

    let nav = MockNavigator::new();
    let data = backend.get_team(team.id).await.unwrap();
    let panel = TeamSettingsPanel::new(backend.clone(), nav, data, "owner@example.com");

    let statuses: Vec<InvitationStatus> = panel
        .pending_invitations()
        .iter()
        .map(|i| i.status())
        .collect();
    assert!(statuses.contains(&InvitationStatus::Expired));
    assert!(statuses.contains(&InvitationStatus::Pending));
}
