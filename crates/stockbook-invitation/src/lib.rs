//! Stockbook Invitation
//!
//! The admin invitation state machine: `pending` is the only live state,
//! with transitions to `accepted`, `revoked`, and a lazily detected
//! `expired`. The transition logic is a pure function over a record and an
//! instant; the service applies it at every read boundary and persists the
//! expiry flip only where a record is reported back to a caller.

#![forbid(unsafe_code)]

/// Pure status transition logic
pub mod state;

/// Invitation service
pub mod service;

pub use service::{AcceptOutcome, InvitationConfig, InvitationService};
pub use state::effective_status;
