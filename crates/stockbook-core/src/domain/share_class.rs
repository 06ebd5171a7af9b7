//! Share class reference data

use crate::identifiers::{CompanyId, ShareClassId};
use serde::{Deserialize, Serialize};

/// A class of shares issued by a company (common, preferred series, etc.).
///
/// Reference data only; holdings and certificates point at a class, and the
/// lifecycle layer never mutates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClass {
    /// Storage-assigned identifier
    pub id: ShareClassId,
    /// Issuing company
    pub company_id: CompanyId,
    /// Class name, e.g. "Common" or "Series A Preferred"
    pub name: String,
    /// Votes carried per share
    pub votes_per_share: u32,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for registering a share class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShareClass {
    /// Issuing company
    pub company_id: CompanyId,
    /// Class name
    pub name: String,
    /// Votes carried per share
    pub votes_per_share: u32,
}
