//! Wall-clock providers
//!
//! `SystemClock` reads the host clock; `FixedClock` is a hand-advanced
//! clock for driving expiry windows in tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use stockbook_core::effects::TimeEffects;

/// Host wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl TimeEffects for SystemClock {
    async fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-advanced clock.
///
/// Starts at a caller-chosen instant and only moves when told to, which
/// makes lazy-expiry behavior reproducible.
#[derive(Debug)]
pub struct FixedClock {
    now_ms: AtomicU64,
}

impl FixedClock {
    /// Create a clock pinned at the given instant
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(now_ms),
        }
    }

    /// Move the clock forward
    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Pin the clock to an absolute instant
    pub fn set_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeEffects for FixedClock {
    async fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_clock_advances_only_when_told() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now_ms().await, 1_000);
        assert_eq!(clock.now_ms().await, 1_000);

        clock.advance_ms(500);
        assert_eq!(clock.now_ms().await, 1_500);

        clock.set_ms(10_000);
        assert_eq!(clock.now_ms().await, 10_000);
    }

    #[tokio::test]
    async fn test_system_clock_is_nonzero() {
        let clock = SystemClock;
        assert!(clock.now_ms().await > 0);
    }
}
