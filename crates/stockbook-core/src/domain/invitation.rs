//! Administrator invitation

use crate::authorization::Role;
use crate::identifiers::{CompanyId, InvitationId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invitation status
///
/// `Pending` is the only state with outgoing transitions. Expiry is
/// detected lazily when a record is read past its expiry instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting acceptance
    Pending,
    /// Accepted; acceptor id and timestamp are stamped
    Accepted,
    /// Expiry window elapsed before acceptance
    Expired,
    /// Withdrawn by an administrator
    Revoked,
}

impl InvitationStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }

    /// Whether the status has no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-boxed offer of a role, addressed to an email and redeemed via an
/// opaque token.
///
/// The token rotates when the invitation is resent; the stored record and
/// its id are stable across resends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    /// Storage-assigned identifier
    pub id: InvitationId,
    /// Invitee email address
    pub email: String,
    /// Role granted on acceptance
    pub role: Role,
    /// Company the role is scoped to, if any
    pub company_id: Option<CompanyId>,
    /// Optional message shown to the invitee
    pub message: Option<String>,
    /// Opaque acceptance token
    pub token: String,
    /// Current status
    pub status: InvitationStatus,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
    /// Expiry instant (ms)
    pub expires_at_ms: u64,
    /// Accepting user, stamped on acceptance
    pub accepted_by: Option<UserId>,
    /// Acceptance timestamp (ms), stamped on acceptance
    pub accepted_at_ms: Option<u64>,
}

impl Invitation {
    /// Whether the invitation is awaiting acceptance
    pub fn is_pending(&self) -> bool {
        matches!(self.status, InvitationStatus::Pending)
    }

    /// Whether the expiry instant has passed
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Input for issuing an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvitation {
    /// Invitee email address
    pub email: String,
    /// Role granted on acceptance
    pub role: Role,
    /// Company the role is scoped to, if any
    pub company_id: Option<CompanyId>,
    /// Optional message shown to the invitee
    pub message: Option<String>,
    /// Days until the invitation expires
    pub expires_in_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_invitation() -> Invitation {
        Invitation {
            id: InvitationId::new(1),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            company_id: None,
            message: None,
            token: "tok-1".to_string(),
            status: InvitationStatus::Pending,
            created_at_ms: 1_000,
            expires_at_ms: 2_000,
            accepted_by: None,
            accepted_at_ms: None,
        }
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let inv = sample_invitation();
        assert!(!inv.is_expired(1_999));
        assert!(inv.is_expired(2_000));
        assert!(inv.is_expired(2_001));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Expired.is_terminal());
        assert!(InvitationStatus::Revoked.is_terminal());
    }
}
