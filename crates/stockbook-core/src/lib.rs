//! Stockbook Core
//!
//! Foundational types for the Stockbook shareholder recordkeeping platform:
//! domain entities and their status machines, the unified error taxonomy,
//! the caller/authorization model, and the pure effect interfaces that the
//! storage and audit collaborators implement.
//!
//! This crate contains no I/O. Everything here is data plus trait
//! signatures; implementations live in `stockbook-store` and the service
//! crates layered above it.

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Entity and actor identifiers
pub mod identifiers;

/// Domain entities and status enums
pub mod domain;

/// Caller classification and the elevated-role predicate
pub mod authorization;

/// Pure effect interfaces (no implementations)
pub mod effects;

pub use authorization::{require_elevated, Caller, Role};
pub use errors::{RegistryError, Result};
pub use identifiers::{
    CertificateId, CompanyId, DtcRequestId, HoldingId, InvitationId, ShareClassId, ShareholderId,
    TransactionId, UserId,
};
