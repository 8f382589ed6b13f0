//! Per-item firing delay statistics.
//!
//! Each work item keeps running aggregates of the delay observed between
//! consecutive firings (or between scheduling and the first firing). The
//! aggregates are O(1) to update and never allocate, so they are safe to
//! maintain inside the tick loop.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Running min/max/total/count of observed firing delays, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemStats {
    /// Time of the previous firing; `None` until the item fires once.
    pub last_fire_us: Option<u64>,
    /// Smallest observed delay. `u64::MAX` while empty.
    pub min_delay_us: u64,
    /// Largest observed delay.
    pub max_delay_us: u64,
    /// Sum of all observed delays.
    pub total_delay_us: u64,
    /// Number of samples.
    pub count: u64,
}

impl Default for WorkItemStats {
    fn default() -> Self {
        Self {
            last_fire_us: None,
            min_delay_us: u64::MAX,
            max_delay_us: 0,
            total_delay_us: 0,
            count: 0,
        }
    }
}

impl WorkItemStats {
    /// Fresh, empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a firing at `now_us`.
    ///
    /// The delay is measured from the previous firing, or from `baseline_us`
    /// when there is none. Returns the recorded delay.
    pub fn update(&mut self, now_us: u64, baseline_us: u64) -> u64 {
        let since = self.last_fire_us.unwrap_or(baseline_us);
        let delay_us = now_us.saturating_sub(since);

        self.min_delay_us = self.min_delay_us.min(delay_us);
        self.max_delay_us = self.max_delay_us.max(delay_us);
        self.total_delay_us = self.total_delay_us.saturating_add(delay_us);
        self.count += 1;
        self.last_fire_us = Some(now_us);

        delay_us
    }

    /// Restore the neutral starting state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether no firing has been recorded since the last reset.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean delay, or `None` with no samples.
    #[must_use]
    pub const fn average_delay_us(&self) -> Option<u64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total_delay_us / self.count)
        }
    }

    /// Emit a debug event with the current aggregates.
    pub fn dump(&self, index: usize) {
        debug!(
            index = index,
            count = self.count,
            avg_us = self.average_delay_us().unwrap_or(0),
            min_us = self.min_delay_us,
            max_us = self.max_delay_us,
            "work item delay stats"
        );
    }

    /// Whether the sample count has just crossed a multiple of `interval`.
    /// An interval of zero disables dumping.
    #[must_use]
    pub const fn dump_due(&self, interval: u64) -> bool {
        interval != 0 && self.count != 0 && self.count % interval == 0
    }
}
