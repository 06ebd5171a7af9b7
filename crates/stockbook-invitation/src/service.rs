//! Invitation Service
//!
//! Coordinator for invitation operations. Issuing, resending, and revoking
//! are admin-gated; acceptance is gated by possession of the token plus an
//! authenticated session. All reads go through the pure
//! [`crate::state::effective_status`] view, and the lazy expiry flip is
//! persisted only where a record is reported back to a caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use stockbook_core::domain::{
    AuditAction, AuditEvent, EntityKind, Invitation, InvitationStatus, NewInvitation, User,
};
use stockbook_core::effects::{AuditEffects, DirectoryStorage, NewInvitationRow, TimeEffects};
use stockbook_core::{require_elevated, Caller, InvitationId, RegistryError, Result};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

// =============================================================================
// Service Configuration
// =============================================================================

/// Configuration for the invitation service
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// Default expiry window for new invitations, in days
    pub default_expires_in_days: u32,

    /// Expiry window applied on resend, in days
    pub resend_expires_in_days: u32,

    /// Maximum message length for invitations
    pub max_message_length: usize,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            default_expires_in_days: 7,
            resend_expires_in_days: 7,
            max_message_length: 1000,
        }
    }
}

// =============================================================================
// Accept Outcome
// =============================================================================

/// Result of an accept attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AcceptOutcome {
    /// The token is valid but the caller holds no session; nothing was
    /// mutated, and an authenticated retry with the same token completes
    /// the acceptance.
    RequiresLogin,
    /// The invitation was accepted and the invited role applied
    Accepted {
        /// The invitation in its accepted state
        invitation: Invitation,
        /// The caller's user row after the grant
        user: User,
    },
}

impl AcceptOutcome {
    /// Whether the caller must authenticate and retry
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::RequiresLogin)
    }
}

// =============================================================================
// Invitation Service
// =============================================================================

/// Invitation service coordinating issue, resend, revoke, and accept
pub struct InvitationService {
    storage: Arc<dyn DirectoryStorage>,
    audit: Arc<dyn AuditEffects>,
    clock: Arc<dyn TimeEffects>,
    config: InvitationConfig,
}

impl InvitationService {
    /// Create a service over the given collaborators
    pub fn new(
        storage: Arc<dyn DirectoryStorage>,
        audit: Arc<dyn AuditEffects>,
        clock: Arc<dyn TimeEffects>,
        config: InvitationConfig,
    ) -> Self {
        Self {
            storage,
            audit,
            clock,
            config,
        }
    }

    /// The service configuration
    pub fn config(&self) -> &InvitationConfig {
        &self.config
    }

    fn generate_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    async fn record_audit(&self, event: AuditEvent) {
        let now_ms = self.clock.now_ms().await;
        if let Err(err) = self.audit.append(event, now_ms).await {
            warn!(%err, "audit append failed; operation result stands");
        }
    }

    async fn invitation_or_not_found(&self, id: InvitationId) -> Result<Invitation> {
        self.storage
            .invitation(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("invitation {id}")))
    }

    /// Gate an admin transition on the record still being live.
    ///
    /// A stored `pending` record past expiry gets its flip persisted
    /// before the rejection is reported, so the caller sees `expired`
    /// rather than a phantom `pending`.
    async fn ensure_live(&self, invitation: &Invitation, verb: &str, verb_past: &str) -> Result<()> {
        let now_ms = self.clock.now_ms().await;
        match crate::state::effective_status(invitation, now_ms) {
            InvitationStatus::Pending => Ok(()),
            InvitationStatus::Expired => {
                if invitation.is_pending() {
                    self.storage.mark_invitation_expired(invitation.id).await?;
                }
                Err(RegistryError::precondition(format!(
                    "cannot {verb} an expired invitation"
                )))
            }
            status => Err(RegistryError::precondition(format!(
                "only pending invitations can be {verb_past} (status: {status})"
            ))),
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Issue an invitation.
    ///
    /// Fails while a live `pending` invitation exists for the email or a
    /// user account already holds it. A stored `pending` record that has
    /// quietly expired does not block; its flip is persisted and the new
    /// invitation is issued.
    pub async fn create(&self, caller: &Caller, input: NewInvitation) -> Result<Invitation> {
        let actor = require_elevated(caller)?;

        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(RegistryError::invalid(format!(
                "invalid invitee email: {:?}",
                input.email
            )));
        }
        if input.expires_in_days == 0 {
            return Err(RegistryError::invalid("expiry window must be at least one day"));
        }
        if let Some(ref message) = input.message {
            if message.len() > self.config.max_message_length {
                return Err(RegistryError::invalid(format!(
                    "message too long: {} > {} max",
                    message.len(),
                    self.config.max_message_length
                )));
            }
        }

        if self.storage.user_by_email(&input.email).await?.is_some() {
            return Err(RegistryError::precondition(format!(
                "a user account already exists for {}",
                input.email
            )));
        }

        let now_ms = self.clock.now_ms().await;
        if let Some(existing) = self.storage.pending_invitation_by_email(&input.email).await? {
            if existing.is_expired(now_ms) {
                // Stale pending row; persist the flip and fall through.
                self.storage.mark_invitation_expired(existing.id).await?;
                debug!(invitation = %existing.id, "expired stale pending invitation");
            } else {
                return Err(RegistryError::precondition(format!(
                    "a pending invitation already exists for {}",
                    input.email
                )));
            }
        }

        let row = NewInvitationRow {
            email: input.email,
            role: input.role,
            company_id: input.company_id,
            message: input.message,
            token: Self::generate_token(),
            created_at_ms: now_ms,
            expires_at_ms: now_ms + u64::from(input.expires_in_days) * DAY_MS,
        };
        let invitation = self.storage.insert_invitation(row).await?;

        info!(invitation = %invitation.id, actor = %actor, "invitation issued");
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: invitation.company_id,
            action: AuditAction::Create,
            entity_kind: EntityKind::Invitation,
            entity_id: invitation.id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({
                "email": invitation.email,
                "role": invitation.role.as_str(),
                "expires_at_ms": invitation.expires_at_ms,
            })),
        })
        .await;
        Ok(invitation)
    }

    // =========================================================================
    // Resend
    // =========================================================================

    /// Reissue a pending invitation with a fresh token.
    ///
    /// The expiry window restarts from now; the previous token stops
    /// resolving, so callers holding it can no longer accept.
    pub async fn resend(&self, caller: &Caller, id: InvitationId) -> Result<Invitation> {
        let actor = require_elevated(caller)?;
        let invitation = self.invitation_or_not_found(id).await?;
        self.ensure_live(&invitation, "resend", "resent").await?;

        let now_ms = self.clock.now_ms().await;
        let expires_at_ms = now_ms + u64::from(self.config.resend_expires_in_days) * DAY_MS;
        let reissued = self
            .storage
            .reissue_invitation_token(id, Self::generate_token(), expires_at_ms)
            .await?;
        if !reissued {
            // The row left pending between our read and the write.
            return Err(RegistryError::precondition(
                "invitation is no longer pending",
            ));
        }

        info!(invitation = %id, actor = %actor, "invitation resent");
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: invitation.company_id,
            action: AuditAction::Update,
            entity_kind: EntityKind::Invitation,
            entity_id: id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({ "expires_at_ms": expires_at_ms })),
        })
        .await;
        self.invitation_or_not_found(id).await
    }

    // =========================================================================
    // Revoke
    // =========================================================================

    /// Withdraw a pending invitation terminally
    pub async fn revoke(&self, caller: &Caller, id: InvitationId) -> Result<Invitation> {
        let actor = require_elevated(caller)?;
        let invitation = self.invitation_or_not_found(id).await?;
        self.ensure_live(&invitation, "revoke", "revoked").await?;

        if !self.storage.mark_invitation_revoked(id).await? {
            return Err(RegistryError::precondition(
                "invitation is no longer pending",
            ));
        }

        info!(invitation = %id, actor = %actor, "invitation revoked");
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: invitation.company_id,
            action: AuditAction::StatusChange,
            entity_kind: EntityKind::Invitation,
            entity_id: id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({
                "status": InvitationStatus::Revoked.as_str()
            })),
        })
        .await;
        self.invitation_or_not_found(id).await
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Resolve an invitation by token.
    ///
    /// A stored `pending` record past expiry is flipped to `expired` in
    /// storage before being returned; terminal records come back as
    /// stored.
    pub async fn get_by_token(&self, token: &str) -> Result<Invitation> {
        let invitation = self
            .storage
            .invitation_by_token(token)
            .await?
            .ok_or_else(|| RegistryError::not_found("invitation not found for token"))?;

        let now_ms = self.clock.now_ms().await;
        if invitation.is_pending() && invitation.is_expired(now_ms) {
            self.storage.mark_invitation_expired(invitation.id).await?;
            debug!(invitation = %invitation.id, "lazily expired on read");
            return self.invitation_or_not_found(invitation.id).await;
        }
        Ok(invitation)
    }

    /// All invitations with their presented statuses.
    ///
    /// The expiry view is applied per record without writing flips back.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Invitation>> {
        require_elevated(caller)?;
        let now_ms = self.clock.now_ms().await;
        let invitations = self.storage.invitations().await?;
        Ok(invitations
            .iter()
            .map(|inv| crate::state::as_effective(inv, now_ms))
            .collect())
    }

    // =========================================================================
    // Accept
    // =========================================================================

    /// Accept an invitation by token.
    ///
    /// Requires a live `pending` record. An anonymous caller gets
    /// [`AcceptOutcome::RequiresLogin`] with nothing mutated; an
    /// authenticated caller claims the invitation and receives the
    /// invited role and company scope on their user row.
    pub async fn accept(&self, caller: &Caller, token: &str) -> Result<AcceptOutcome> {
        let invitation = self
            .storage
            .invitation_by_token(token)
            .await?
            .ok_or_else(|| RegistryError::not_found("invitation not found for token"))?;

        let now_ms = self.clock.now_ms().await;
        match crate::state::effective_status(&invitation, now_ms) {
            InvitationStatus::Pending => {}
            InvitationStatus::Expired => {
                if invitation.is_pending() {
                    self.storage.mark_invitation_expired(invitation.id).await?;
                }
                return Err(RegistryError::precondition("invitation has expired"));
            }
            status => {
                return Err(RegistryError::precondition(format!(
                    "invitation already {status}"
                )));
            }
        }

        let Some(user_id) = caller.user_id() else {
            return Ok(AcceptOutcome::RequiresLogin);
        };
        let user = self
            .storage
            .user(user_id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("user {user_id}")))?;

        // Claim first; the conditional write makes the first accept the
        // only one that can win a race on the same token.
        let claimed = self
            .storage
            .mark_invitation_accepted(invitation.id, user_id, now_ms)
            .await?;
        if !claimed {
            return Err(RegistryError::precondition("invitation already accepted"));
        }
        if !self
            .storage
            .apply_user_grant(user_id, invitation.role, invitation.company_id)
            .await?
        {
            return Err(RegistryError::internal(format!(
                "user {user_id} disappeared while accepting invitation"
            )));
        }

        let invitation = self.invitation_or_not_found(invitation.id).await?;
        let user = self
            .storage
            .user(user.id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("user {user_id}")))?;

        info!(invitation = %invitation.id, user = %user.id, "invitation accepted");
        self.record_audit(AuditEvent {
            user_id,
            company_id: invitation.company_id,
            action: AuditAction::StatusChange,
            entity_kind: EntityKind::Invitation,
            entity_id: invitation.id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({
                "status": InvitationStatus::Accepted.as_str(),
                "accepted_by": user.id.value(),
            })),
        })
        .await;

        Ok(AcceptOutcome::Accepted { invitation, user })
    }
}
