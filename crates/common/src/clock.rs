//! Clock abstraction
//!
//! Venue simulations and the price feed staleness checks read time
//! through this trait so that tests can advance time deterministically.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of unix timestamps in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock for deterministic tests and simulations
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    /// Advance the clock by `seconds`
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Set the clock to an absolute timestamp
    pub fn set(&self, timestamp: i64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_700_000_000);
        assert_eq!(clock.now(), 1_700_000_000);

        clock.advance(180);
        assert_eq!(clock.now(), 1_700_000_180);
    }

    #[test]
    fn test_manual_clock_shared_handles() {
        let clock = ManualClock::new(0);
        let other = clock.clone();

        clock.advance(60);
        assert_eq!(other.now(), 60);
    }

    #[test]
    fn test_system_clock_monotonic_enough() {
        let clock = SystemClock;
        assert!(clock.now() > 1_600_000_000);
    }
}
