//! Company (issuer) profile

use crate::identifiers::CompanyId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Company status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    /// Actively serviced issuer
    Active,
    /// No longer serviced, records retained
    Inactive,
    /// Servicing paused pending review
    Suspended,
}

impl CompanyStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issuer whose shareholder records this platform maintains.
///
/// A company owns shareholders, share classes, transactions, and depository
/// requests. It can only be deleted once no shareholder references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Storage-assigned identifier
    pub id: CompanyId,
    /// Legal name
    pub name: String,
    /// Exchange ticker, if listed
    pub ticker: Option<String>,
    /// Current servicing status
    pub status: CompanyStatus,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for creating a company profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompany {
    /// Legal name
    pub name: String,
    /// Exchange ticker, if listed
    pub ticker: Option<String>,
}
