//! Time source abstraction.
//!
//! Lease expiry, worker ages and retention cutoffs are all comparisons
//! against "now"; routing them through a `Clock` keeps every loop testable
//! without timers or sleeps.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
///
/// Clones share the same underlying instant, so a test can hold a handle
/// and advance time under components that own another clone.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    /// Create a fake clock starting at the current wall-clock time.
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc::now())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_clock_advances_shared_instant() {
        let clock = FakeClock::new();
        let other = clock.clone();
        let before = clock.now();

        other.advance(Duration::seconds(90));
        assert_eq!(clock.now(), before + Duration::seconds(90));
    }
}
