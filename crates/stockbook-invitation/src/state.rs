//! Pure invitation status logic
//!
//! Expiry is never swept by a background job; it is computed from the
//! record and the current instant wherever a record crosses a read
//! boundary. Keeping the computation pure separates the state machine
//! from its persistence: storage flips happen only at the call sites
//! that report the record, and tests can drive the machine with a bare
//! clock value.

use stockbook_core::domain::{Invitation, InvitationStatus};

/// The status an invitation presents at the given instant.
///
/// A stored `pending` record past its expiry instant presents as
/// `expired`; every terminal status presents as itself. The function
/// never resurrects a terminal record.
pub fn effective_status(invitation: &Invitation, now_ms: u64) -> InvitationStatus {
    match invitation.status {
        InvitationStatus::Pending if invitation.is_expired(now_ms) => InvitationStatus::Expired,
        status => status,
    }
}

/// Copy of the record with its presented status applied.
///
/// Used by list views, which report effective statuses without writing
/// the flips back.
pub fn as_effective(invitation: &Invitation, now_ms: u64) -> Invitation {
    let mut view = invitation.clone();
    view.status = effective_status(invitation, now_ms);
    view
}
