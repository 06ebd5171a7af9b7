//! Book-entry holding

use crate::identifiers::{HoldingId, ShareClassId, ShareholderId};
use serde::{Deserialize, Serialize};

/// A quantity of shares of one class owned by one shareholder.
///
/// Holdings are read-only input to the shareholder deletion check; the
/// lifecycle layer never creates or destroys them on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Storage-assigned identifier
    pub id: HoldingId,
    /// Owning shareholder account
    pub shareholder_id: ShareholderId,
    /// Share class of the position
    pub share_class_id: ShareClassId,
    /// Number of shares held
    pub shares: u64,
    /// Transfer-restricted position
    pub restricted: bool,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
}

/// Input for recording a holding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHolding {
    /// Owning shareholder account
    pub shareholder_id: ShareholderId,
    /// Share class of the position
    pub share_class_id: ShareClassId,
    /// Number of shares held
    pub shares: u64,
    /// Transfer-restricted position
    pub restricted: bool,
}
