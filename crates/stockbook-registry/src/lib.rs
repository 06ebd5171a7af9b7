//! Stockbook Registry
//!
//! Lifecycle services over the shareholder record: admin CRUD for the
//! record entities, the referential deletion guards for companies and
//! shareholders, and the bulk status-transition operators for
//! certificates, transactions, and depository requests.
//!
//! # Architecture
//!
//! Precondition checks are pure functions over rows fetched up front
//! (`guards`); the service orchestrates fetch, check, write, and audit in
//! that order. An operation that fails its guard performs no write, and a
//! caller without the elevated role fails before any read.

#![forbid(unsafe_code)]

/// Pure deletion precondition checks
pub mod guards;

/// Entity services and deletion operations
pub mod service;

/// Bulk status-transition operators
pub mod bulk;

pub use bulk::BulkOutcome;
pub use guards::{check_company_deletable, check_shareholder_deletable, GuardReject};
pub use service::RegistryService;
