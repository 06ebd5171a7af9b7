//! Audit trail interface

use crate::domain::AuditEvent;
use crate::errors::Result;
use async_trait::async_trait;

/// Sink for audit events.
///
/// Appends are fire-and-forget from the lifecycle layer's perspective: a
/// failed append is logged by the caller and never undoes the operation it
/// was recording.
#[async_trait]
pub trait AuditEffects: Send + Sync {
    /// Persist one audit event with the given timestamp
    async fn append(&self, event: AuditEvent, created_at_ms: u64) -> Result<()>;
}
