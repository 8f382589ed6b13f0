//! Time sources for the work queue.
//!
//! All scheduling arithmetic is done in `u64` microseconds relative to an
//! arbitrary origin. [`MonotonicClock`] anchors that origin at construction;
//! [`ManualClock`] is advanced explicitly and makes tick processing
//! deterministic in tests and simulations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of monotonic microsecond timestamps.
pub trait Clock: Send + Sync + 'static {
    /// Current time in microseconds since the clock's origin.
    fn now_us(&self) -> u64;
}

/// Wall-clock backed monotonic time, measured from the moment of creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// The instant corresponding to `0` on this clock.
    #[must_use]
    pub const fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        duration_to_us(self.origin.elapsed())
    }
}

/// Manually driven clock. Time only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicU64,
}

impl ManualClock {
    /// Create a manual clock starting at `start_us`.
    #[must_use]
    pub const fn new(start_us: u64) -> Self {
        Self {
            now_us: AtomicU64::new(start_us),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_us: u64) {
        self.now_us.store(now_us, Ordering::Release);
    }

    /// Move time forward by `delta_us` and return the new time.
    pub fn advance(&self, delta_us: u64) -> u64 {
        self.now_us.fetch_add(delta_us, Ordering::AcqRel) + delta_us
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::Acquire)
    }
}

/// Convert a duration to whole microseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_to_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
