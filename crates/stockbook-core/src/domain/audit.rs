//! Audit trail types
//!
//! Every successful destructive or status-changing operation appends one
//! audit event capturing the actor, the action, and the entity touched.
//! The audit collaborator is fire-and-forget from the lifecycle layer's
//! perspective.

use crate::identifiers::{CompanyId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action recorded by an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    /// A status field transition, including bulk transitions
    StatusChange,
}

impl AuditAction {
    /// Wire spelling of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::StatusChange => "STATUS_CHANGE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity an audit event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Shareholder,
    ShareClass,
    Holding,
    Certificate,
    Transaction,
    DtcRequest,
    Invitation,
    User,
}

impl EntityKind {
    /// Wire spelling of the entity kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Shareholder => "shareholder",
            Self::ShareClass => "share_class",
            Self::Holding => "holding",
            Self::Certificate => "certificate",
            Self::Transaction => "transaction",
            Self::DtcRequest => "dtc_request",
            Self::Invitation => "invitation",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit event submitted to the audit collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Acting user
    pub user_id: UserId,
    /// Company context, when the entity is company-scoped
    pub company_id: Option<CompanyId>,
    /// Action performed
    pub action: AuditAction,
    /// Kind of entity touched
    pub entity_kind: EntityKind,
    /// Raw id of the entity touched
    pub entity_id: u64,
    /// Entity state before the action, for destructive operations
    pub old_values: Option<serde_json::Value>,
    /// Entity state after the action, when it changed
    pub new_values: Option<serde_json::Value>,
}

impl AuditEvent {
    /// Build a DELETE event capturing the pre-delete state
    pub fn deletion(
        user_id: UserId,
        company_id: Option<CompanyId>,
        entity_kind: EntityKind,
        entity_id: u64,
        old_values: serde_json::Value,
    ) -> Self {
        Self {
            user_id,
            company_id,
            action: AuditAction::Delete,
            entity_kind,
            entity_id,
            old_values: Some(old_values),
            new_values: None,
        }
    }
}

/// A persisted audit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Storage-assigned identifier
    pub id: u64,
    /// The recorded event
    pub event: AuditEvent,
    /// Persistence timestamp (ms)
    pub created_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_spelling() {
        assert_eq!(AuditAction::Delete.as_str(), "DELETE");
        assert_eq!(AuditAction::StatusChange.as_str(), "STATUS_CHANGE");
    }

    #[test]
    fn test_deletion_event_captures_old_values() {
        let event = AuditEvent::deletion(
            UserId::new(9),
            Some(CompanyId::new(2)),
            EntityKind::Shareholder,
            14,
            serde_json::json!({ "id": 14, "name": "Ada" }),
        );
        assert_eq!(event.action, AuditAction::Delete);
        assert_eq!(event.entity_kind, EntityKind::Shareholder);
        assert_eq!(event.entity_id, 14);
        assert!(event.old_values.is_some());
        assert!(event.new_values.is_none());
    }
}
