//! Stockbook Store
//!
//! Implementations of the `stockbook-core` effect interfaces: an in-memory
//! row store with auto-increment integer ids, an audit log kept alongside
//! it, and wall-clock providers.
//!
//! The in-memory store mirrors the row-level semantics the lifecycle layer
//! relies on: conditional updates report whether a row matched,
//! updates against missing ids are silent no-ops, and an injectable
//! availability flag makes every operation fail fast with a storage error
//! for outage testing.

#![forbid(unsafe_code)]

/// Wall-clock providers
pub mod clock;

/// In-memory table store
pub mod memory;

pub use clock::{FixedClock, SystemClock};
pub use memory::MemoryStore;
