//! Bulk status-transition operators
//!
//! One target transition applied across a caller-supplied list of ids.
//! Each id gets its own conditional update, issued sequentially in input
//! order; the batch is atomic per row but not across rows, so a storage
//! failure partway through leaves the earlier updates in place.
//!
//! The returned count is the number of rows the updates actually matched.
//! Ids that match nothing, because the row is missing or not in an
//! eligible status, are silent no-ops. Re-running a batch is therefore
//! idempotent: the second run matches nothing and changes nothing.

use serde::{Deserialize, Serialize};
use tracing::info;

use stockbook_core::domain::DtcStatus;
use stockbook_core::{
    require_elevated, Caller, CertificateId, DtcRequestId, Result, TransactionId,
};

use crate::service::RegistryService;

/// Aggregate result of a bulk operation.
///
/// There is no per-id error list; callers that need to know which ids
/// were skipped must re-read the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// True for every batch that ran to completion
    pub success: bool,
    /// Rows actually updated
    pub count: u64,
}

impl RegistryService {
    /// Cancel every `active` certificate in the list, stamping the
    /// cancel date.
    pub async fn bulk_cancel_certificates(
        &self,
        caller: &Caller,
        ids: &[CertificateId],
    ) -> Result<BulkOutcome> {
        let actor = require_elevated(caller)?;
        let cancelled_at_ms = self.now_ms().await;

        let mut count = 0u64;
        for &id in ids {
            if self.storage().cancel_certificate(id, cancelled_at_ms).await? {
                count += 1;
            }
        }

        info!(actor = %actor, requested = ids.len(), count, "bulk certificate cancel");
        Ok(BulkOutcome {
            success: true,
            count,
        })
    }

    /// Approve every `pending` transaction in the list, stamping the
    /// caller as approver.
    pub async fn bulk_approve_transactions(
        &self,
        caller: &Caller,
        ids: &[TransactionId],
    ) -> Result<BulkOutcome> {
        let actor = require_elevated(caller)?;
        let approved_at_ms = self.now_ms().await;

        let mut count = 0u64;
        for &id in ids {
            if self
                .storage()
                .approve_transaction(id, actor, approved_at_ms)
                .await?
            {
                count += 1;
            }
        }

        info!(actor = %actor, requested = ids.len(), count, "bulk transaction approve");
        Ok(BulkOutcome {
            success: true,
            count,
        })
    }

    /// Reject every `pending` transaction in the list, recording the
    /// optional free-text reason on each.
    pub async fn bulk_reject_transactions(
        &self,
        caller: &Caller,
        ids: &[TransactionId],
        reason: Option<String>,
    ) -> Result<BulkOutcome> {
        let actor = require_elevated(caller)?;

        let mut count = 0u64;
        for &id in ids {
            if self
                .storage()
                .reject_transaction(id, reason.clone())
                .await?
            {
                count += 1;
            }
        }

        info!(actor = %actor, requested = ids.len(), count, "bulk transaction reject");
        Ok(BulkOutcome {
            success: true,
            count,
        })
    }

    /// Move every request in the list to one target status.
    ///
    /// No transition guard applies beyond the status enum itself; any
    /// existing row matches.
    pub async fn bulk_update_dtc_status(
        &self,
        caller: &Caller,
        ids: &[DtcRequestId],
        status: DtcStatus,
    ) -> Result<BulkOutcome> {
        let actor = require_elevated(caller)?;

        let mut count = 0u64;
        for &id in ids {
            if self.storage().set_dtc_status(id, status).await? {
                count += 1;
            }
        }

        info!(actor = %actor, requested = ids.len(), count, status = %status, "bulk dtc status update");
        Ok(BulkOutcome {
            success: true,
            count,
        })
    }
}
