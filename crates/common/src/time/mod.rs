//! Time abstraction for testability
//!
//! Every time-dependent rule in the meeting lifecycle (status bands, staking
//! cutoff, check-in deadline, invitation expiry) reads "now" through a
//! [`Clock`] so tests can pin the wall clock to an exact boundary.
//!
//! # Examples
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use showup_common::time::{Clock, MockClock};
//!
//! let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
//! let clock = MockClock::at(start);
//! clock.advance(Duration::minutes(15));
//! assert_eq!(clock.now(), start + Duration::minutes(15));
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Trait for wall-clock reads, injected wherever "now" matters.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Seconds since the UNIX epoch.
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same underlying instant, so a clock handed to a service
/// can still be moved forward by the test that created it.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a mock clock frozen at the current real time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a mock clock frozen at `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(instant)) }
    }

    /// Advance the clock without waiting.
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock();
        *current += duration;
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
