//! Wall-clock time interface
//!
//! Lifecycle operations stamp timestamps and evaluate invitation expiry
//! against a clock they are handed, never against the system clock
//! directly. Tests substitute a fixed clock to drive expiry forward.

use async_trait::async_trait;

/// Provider of the current wall-clock time
#[async_trait]
pub trait TimeEffects: Send + Sync {
    /// Current Unix timestamp in milliseconds
    async fn now_ms(&self) -> u64;
}
