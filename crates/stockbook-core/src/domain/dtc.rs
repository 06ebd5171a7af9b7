//! DTC/DWAC depository request

use crate::identifiers::{CompanyId, DtcRequestId, ShareholderId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Depository request status
///
/// Bulk status updates move a set of requests to one target status with no
/// transition guard beyond the enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtcStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl DtcStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DtcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the share movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DtcDirection {
    /// Certificate or book-entry shares into a broker depository account
    Deposit,
    /// Out of the depository back to direct registration
    Withdrawal,
}

/// A request to move shares between book-entry/certificate form and a
/// broker's depository account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtcRequest {
    /// Storage-assigned identifier
    pub id: DtcRequestId,
    /// Company whose shares move
    pub company_id: CompanyId,
    /// Holder the request belongs to
    pub shareholder_id: ShareholderId,
    /// Movement direction
    pub direction: DtcDirection,
    /// Shares to move
    pub shares: u64,
    /// Current status
    pub status: DtcStatus,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for filing a depository request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDtcRequest {
    /// Company whose shares move
    pub company_id: CompanyId,
    /// Holder the request belongs to
    pub shareholder_id: ShareholderId,
    /// Movement direction
    pub direction: DtcDirection,
    /// Shares to move
    pub shares: u64,
}
