//! Deletion precondition checks
//!
//! Guard evaluation is pure and synchronous over rows the service fetched
//! beforehand. A check returns `None` when the delete may proceed, or a
//! typed rejection the service surfaces as a precondition error. No guard
//! performs I/O.

use stockbook_core::domain::{Holding, Shareholder};

/// Typed guard rejection for consistent error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardReject {
    /// Stable machine-readable code
    pub code: &'static str,
    /// Human-readable message for the caller
    pub message: String,
}

impl std::fmt::Display for GuardReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Sum of shares across a set of holdings
pub fn outstanding_shares(holdings: &[Holding]) -> u64 {
    holdings.iter().map(|h| h.shares).sum()
}

/// A company may be deleted only when no shareholder references it.
pub fn check_company_deletable(dependents: &[Shareholder]) -> Option<GuardReject> {
    if dependents.is_empty() {
        None
    } else {
        Some(GuardReject {
            code: "company-has-shareholders",
            message: format!(
                "Cannot delete company with existing shareholders ({} on record). \
                 Remove or transfer the shareholders first.",
                dependents.len()
            ),
        })
    }
}

/// A shareholder may be deleted only when its holdings sum to zero shares.
///
/// Empty holdings and holdings whose share counts are all zero both pass.
pub fn check_shareholder_deletable(holdings: &[Holding]) -> Option<GuardReject> {
    let shares = outstanding_shares(holdings);
    if shares == 0 {
        None
    } else {
        Some(GuardReject {
            code: "shareholder-has-shares",
            message: format!(
                "Cannot delete shareholder with outstanding shares ({shares} across {} holdings). \
                 Transfer the shares out first.",
                holdings.len()
            ),
        })
    }
}
