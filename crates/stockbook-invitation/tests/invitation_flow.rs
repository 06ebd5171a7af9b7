//! Invitation lifecycle flows against the in-memory store

use std::sync::Arc;

use assert_matches::assert_matches;
use stockbook_core::domain::{InvitationStatus, NewInvitation, NewUser};
use stockbook_core::effects::DirectoryStorage;
use stockbook_core::{Caller, RegistryError, Role, UserId};
use stockbook_invitation::{AcceptOutcome, InvitationConfig, InvitationService};
use stockbook_store::{FixedClock, MemoryStore};

const START_MS: u64 = 1_700_000_000_000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
    service: InvitationService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(START_MS));
    let service = InvitationService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
        InvitationConfig::default(),
    );
    Harness {
        store,
        clock,
        service,
    }
}

fn admin() -> Caller {
    Caller::admin(UserId::new(1))
}

fn invite(email: &str) -> NewInvitation {
    NewInvitation {
        email: email.to_string(),
        role: Role::Admin,
        company_id: None,
        message: Some("Welcome aboard".to_string()),
        expires_in_days: 7,
    }
}

/// Provision the account the invitee signs in with; session handling
/// itself is outside this platform.
async fn signup(h: &Harness, email: &str) -> UserId {
    let user = h
        .store
        .insert_user(
            NewUser {
                email: email.to_string(),
                role: Role::Standard,
                company_id: None,
            },
            START_MS,
        )
        .await
        .unwrap();
    user.id
}

#[tokio::test]
async fn first_accept_wins_and_grants_the_invited_role() {
    let h = harness();
    let invitation = h
        .service
        .create(&admin(), invite("new.admin@example.com"))
        .await
        .unwrap();

    let user_id = signup(&h, "new.admin@example.com").await;
    let caller = Caller::authenticated(user_id, Role::Standard);

    let outcome = h.service.accept(&caller, &invitation.token).await.unwrap();
    let AcceptOutcome::Accepted {
        invitation: accepted,
        user,
    } = outcome
    else {
        panic!("expected completed acceptance");
    };
    assert_eq!(accepted.status, InvitationStatus::Accepted);
    assert_eq!(accepted.accepted_by, Some(user_id));
    assert_eq!(accepted.accepted_at_ms, Some(START_MS));
    assert_eq!(user.role, Role::Admin);

    // The same token cannot be redeemed twice.
    let err = h
        .service
        .accept(&caller, &invitation.token)
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("already accepted"));
}

#[tokio::test]
async fn anonymous_accept_defers_without_mutating() {
    let h = harness();
    let invitation = h
        .service
        .create(&admin(), invite("invitee@example.com"))
        .await
        .unwrap();

    let outcome = h
        .service
        .accept(&Caller::Anonymous, &invitation.token)
        .await
        .unwrap();
    assert!(outcome.requires_login());

    // Nothing was written; the record is still live and acceptable.
    let stored = h.store.invitation(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);

    let user_id = signup(&h, "invitee@example.com").await;
    let caller = Caller::authenticated(user_id, Role::Standard);
    let retry = h.service.accept(&caller, &invitation.token).await.unwrap();
    assert!(!retry.requires_login());
}

#[tokio::test]
async fn expiry_is_detected_lazily_on_read() {
    let h = harness();
    let invitation = h
        .service
        .create(
            &admin(),
            NewInvitation {
                expires_in_days: 1,
                ..invite("late@example.com")
            },
        )
        .await
        .unwrap();

    // No sweep runs; the clock simply passes the expiry instant.
    h.clock.advance_ms(DAY_MS);

    let read = h.service.get_by_token(&invitation.token).await.unwrap();
    assert_eq!(read.status, InvitationStatus::Expired);

    // The flip was persisted, not just reported.
    let stored = h.store.invitation(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn expired_invitation_cannot_be_accepted() {
    let h = harness();
    let invitation = h
        .service
        .create(
            &admin(),
            NewInvitation {
                expires_in_days: 1,
                ..invite("late@example.com")
            },
        )
        .await
        .unwrap();
    let user_id = signup(&h, "late@example.com").await;
    h.clock.advance_ms(2 * DAY_MS);

    let err = h
        .service
        .accept(
            &Caller::authenticated(user_id, Role::Standard),
            &invitation.token,
        )
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("expired"));
}

#[tokio::test]
async fn resend_invalidates_the_prior_token() {
    let h = harness();
    let invitation = h
        .service
        .create(&admin(), invite("resend@example.com"))
        .await
        .unwrap();
    let old_token = invitation.token.clone();

    let resent = h.service.resend(&admin(), invitation.id).await.unwrap();
    assert_ne!(resent.token, old_token);
    assert_eq!(
        resent.expires_at_ms,
        START_MS + 7 * DAY_MS,
        "resend restarts the fixed seven-day window"
    );

    let user_id = signup(&h, "resend@example.com").await;
    let caller = Caller::authenticated(user_id, Role::Standard);

    // The old token no longer resolves to any record.
    assert_matches!(
        h.service.accept(&caller, &old_token).await,
        Err(RegistryError::NotFound { .. })
    );

    let outcome = h.service.accept(&caller, &resent.token).await.unwrap();
    assert!(!outcome.requires_login());
}

#[tokio::test]
async fn duplicate_pending_invitation_is_rejected() {
    let h = harness();
    h.service
        .create(&admin(), invite("dup@example.com"))
        .await
        .unwrap();

    let err = h
        .service
        .create(&admin(), invite("dup@example.com"))
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("pending invitation already exists"));
}

#[tokio::test]
async fn stale_expired_pending_does_not_block_a_new_invitation() {
    let h = harness();
    let first = h
        .service
        .create(
            &admin(),
            NewInvitation {
                expires_in_days: 1,
                ..invite("again@example.com")
            },
        )
        .await
        .unwrap();

    h.clock.advance_ms(2 * DAY_MS);

    // The stale row is flipped and a fresh invitation goes out.
    let second = h
        .service
        .create(&admin(), invite("again@example.com"))
        .await
        .unwrap();
    assert_ne!(second.id, first.id);

    let stored = h.store.invitation(first.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn existing_user_email_is_rejected() {
    let h = harness();
    signup(&h, "taken@example.com").await;

    let err = h
        .service
        .create(&admin(), invite("taken@example.com"))
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn revoke_is_terminal() {
    let h = harness();
    let invitation = h
        .service
        .create(&admin(), invite("revoked@example.com"))
        .await
        .unwrap();

    let revoked = h.service.revoke(&admin(), invitation.id).await.unwrap();
    assert_eq!(revoked.status, InvitationStatus::Revoked);

    let user_id = signup(&h, "revoked@example.com").await;
    let err = h
        .service
        .accept(
            &Caller::authenticated(user_id, Role::Standard),
            &invitation.token,
        )
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });

    // No transition out of revoked.
    assert_matches!(
        h.service.resend(&admin(), invitation.id).await,
        Err(RegistryError::Precondition { .. })
    );
    assert_matches!(
        h.service.revoke(&admin(), invitation.id).await,
        Err(RegistryError::Precondition { .. })
    );
}

#[tokio::test]
async fn resend_and_revoke_reject_expired_invitations() {
    let h = harness();
    let invitation = h
        .service
        .create(
            &admin(),
            NewInvitation {
                expires_in_days: 1,
                ..invite("gone@example.com")
            },
        )
        .await
        .unwrap();
    h.clock.advance_ms(DAY_MS);

    let err = h.service.resend(&admin(), invitation.id).await.unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("expired"));

    assert_matches!(
        h.service.revoke(&admin(), invitation.id).await,
        Err(RegistryError::Precondition { .. })
    );
}

#[tokio::test]
async fn admin_operations_require_the_elevated_role() {
    let h = harness();
    let invitation = h
        .service
        .create(&admin(), invite("gated@example.com"))
        .await
        .unwrap();

    let standard = Caller::authenticated(UserId::new(5), Role::Standard);

    assert_matches!(
        h.service.create(&standard, invite("other@example.com")).await,
        Err(RegistryError::Unauthorized { .. })
    );
    assert_matches!(
        h.service.resend(&Caller::Anonymous, invitation.id).await,
        Err(RegistryError::Unauthorized { .. })
    );
    assert_matches!(
        h.service.revoke(&standard, invitation.id).await,
        Err(RegistryError::Unauthorized { .. })
    );
    assert_matches!(
        h.service.list(&standard).await,
        Err(RegistryError::Unauthorized { .. })
    );

    // The gated calls wrote nothing.
    let stored = h.store.invitation(invitation.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
    assert_eq!(stored.token, invitation.token);
}

#[tokio::test]
async fn list_reports_effective_statuses_without_flipping_storage() {
    let h = harness();
    let live = h
        .service
        .create(&admin(), invite("live@example.com"))
        .await
        .unwrap();
    let lapsing = h
        .service
        .create(
            &admin(),
            NewInvitation {
                expires_in_days: 1,
                ..invite("lapsing@example.com")
            },
        )
        .await
        .unwrap();

    h.clock.advance_ms(DAY_MS);

    let listed = h.service.list(&admin()).await.unwrap();
    let by_id = |id| listed.iter().find(|i| i.id == id).unwrap();
    assert_eq!(by_id(live.id).status, InvitationStatus::Pending);
    assert_eq!(by_id(lapsing.id).status, InvitationStatus::Expired);

    // The listing is a pure view; the stored row is untouched until a
    // token read reports it.
    let stored = h.store.invitation(lapsing.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn invalid_create_inputs_fail_before_any_write() {
    let h = harness();

    assert_matches!(
        h.service.create(&admin(), invite("not-an-email")).await,
        Err(RegistryError::Invalid { .. })
    );
    assert_matches!(
        h.service
            .create(
                &admin(),
                NewInvitation {
                    expires_in_days: 0,
                    ..invite("zero@example.com")
                }
            )
            .await,
        Err(RegistryError::Invalid { .. })
    );
    assert_matches!(
        h.service
            .create(
                &admin(),
                NewInvitation {
                    message: Some("x".repeat(2000)),
                    ..invite("long@example.com")
                }
            )
            .await,
        Err(RegistryError::Invalid { .. })
    );

    assert!(h.store.invitations().await.unwrap().is_empty());
}
