//! Shareholder account

use crate::identifiers::{CompanyId, ShareholderId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shareholder account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareholderStatus {
    Active,
    Inactive,
    Suspended,
    /// Holder reported deceased; estate processing pending
    Deceased,
    /// Position remitted to the state as unclaimed property
    Escheated,
}

impl ShareholderStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
            Self::Deceased => "deceased",
            Self::Escheated => "escheated",
        }
    }
}

impl fmt::Display for ShareholderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account holding positions in one company's share classes.
///
/// Deletable only once every holding on the account has been reduced to
/// zero shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shareholder {
    /// Storage-assigned identifier
    pub id: ShareholderId,
    /// Owning company
    pub company_id: CompanyId,
    /// Registered holder name
    pub name: String,
    /// Contact email, if on file
    pub email: Option<String>,
    /// Current account status
    pub status: ShareholderStatus,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for opening a shareholder account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareholder {
    /// Owning company
    pub company_id: CompanyId,
    /// Registered holder name
    pub name: String,
    /// Contact email, if on file
    pub email: Option<String>,
}
