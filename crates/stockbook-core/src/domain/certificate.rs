//! Physical share certificate record

use crate::identifiers::{CertificateId, ShareClassId, ShareholderId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Certificate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    /// Outstanding and valid
    Active,
    /// Reported lost by the holder
    Lost,
    /// Reported stolen
    Stolen,
    /// Surrendered as part of a transfer
    Transferred,
    /// Cancelled by the agent
    Cancelled,
    /// Issued but not yet delivered
    Pending,
}

impl CertificateStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Lost => "lost",
            Self::Stolen => "stolen",
            Self::Transferred => "transferred",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A paper-record representation of a block of shares, distinct from
/// book-entry holdings.
///
/// Only `active` certificates are eligible for bulk cancellation; a
/// successful cancellation stamps `cancelled_at_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// Storage-assigned identifier
    pub id: CertificateId,
    /// Holder of record
    pub shareholder_id: ShareholderId,
    /// Share class the certificate represents
    pub share_class_id: ShareClassId,
    /// Printed certificate number
    pub certificate_number: String,
    /// Shares represented
    pub shares: u64,
    /// Current status
    pub status: CertificateStatus,
    /// Issue timestamp (ms)
    pub issued_at_ms: u64,
    /// Cancellation timestamp (ms), stamped when cancelled
    pub cancelled_at_ms: Option<u64>,
}

impl Certificate {
    /// Whether the certificate is eligible for cancellation
    pub fn is_active(&self) -> bool {
        matches!(self.status, CertificateStatus::Active)
    }
}

/// Input for issuing a certificate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCertificate {
    /// Holder of record
    pub shareholder_id: ShareholderId,
    /// Share class the certificate represents
    pub share_class_id: ShareClassId,
    /// Printed certificate number
    pub certificate_number: String,
    /// Shares represented
    pub shares: u64,
}
