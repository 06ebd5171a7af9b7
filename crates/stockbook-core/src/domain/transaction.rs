//! Share transaction record

use crate::identifiers::{CompanyId, TransactionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting review
    Pending,
    /// Approved by an administrator
    Approved,
    /// Rejected by an administrator
    Rejected,
    /// Settled
    Completed,
    /// Being processed by the agent
    Processing,
}

impl TransactionStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Processing => "processing",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of share movement a transaction records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// New shares issued to a holder
    Issuance,
    /// Shares moved between holders
    Transfer,
    /// Shares bought back by the issuer
    Repurchase,
}

impl TransactionKind {
    /// Wire spelling of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issuance => "issuance",
            Self::Transfer => "transfer",
            Self::Repurchase => "repurchase",
        }
    }
}

/// A recorded share movement for one company.
///
/// Bulk approval stamps the approver identity and timestamp; bulk rejection
/// records an optional free-text reason. Both apply to `pending` rows only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Storage-assigned identifier
    pub id: TransactionId,
    /// Company whose register the transaction touches
    pub company_id: CompanyId,
    /// Kind of movement
    pub kind: TransactionKind,
    /// Shares moved
    pub shares: u64,
    /// Current status
    pub status: TransactionStatus,
    /// Approving administrator, stamped on approval
    pub approved_by: Option<UserId>,
    /// Approval timestamp (ms), stamped on approval
    pub approved_at_ms: Option<u64>,
    /// Reason recorded on rejection
    pub rejection_reason: Option<String>,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for recording a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Company whose register the transaction touches
    pub company_id: CompanyId,
    /// Kind of movement
    pub kind: TransactionKind,
    /// Shares moved
    pub shares: u64,
}
