//! Work items: one periodic callback with its timing state.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::stats::WorkItemStats;

/// Something the work queue can invoke on every period.
///
/// Implemented for every `Fn() + Send + Sync + 'static`; whatever argument the
/// callback needs is captured by the closure.
///
/// ```rust
/// use prometheus_work_queue::core::WorkCallback;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let hits = Arc::new(AtomicU32::new(0));
/// let counter = Arc::clone(&hits);
/// let cb = move || {
///     counter.fetch_add(1, Ordering::Relaxed);
/// };
/// cb.call();
/// assert_eq!(hits.load(Ordering::Relaxed), 1);
/// ```
pub trait WorkCallback: Send + Sync + 'static {
    /// Run the callback once.
    fn call(&self);
}

impl<F> WorkCallback for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn call(&self) {
        self();
    }
}

/// Opaque reference to a registered work item.
///
/// The generation makes handles single-use per registration: once the slot
/// is released or the queue finalized, every operation with the old handle
/// reports it as stale even if the index has been handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItemHandle {
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

impl WorkItemHandle {
    /// Slot index in the registry.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Registration generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for WorkItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.index, self.generation)
    }
}

/// A registered periodic callback.
pub struct WorkItem {
    callback: Arc<dyn WorkCallback>,
    period_us: u64,
    baseline_us: u64,
    active: bool,
    stats: WorkItemStats,
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("period_us", &self.period_us)
            .field("baseline_us", &self.baseline_us)
            .field("active", &self.active)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl WorkItem {
    /// New inactive item. `period_us` must be non-zero; the registry checks.
    pub(crate) fn new(period_us: u64, callback: Arc<dyn WorkCallback>) -> Self {
        Self {
            callback,
            period_us,
            baseline_us: 0,
            active: false,
            stats: WorkItemStats::default(),
        }
    }

    /// Firing period in microseconds.
    #[must_use]
    pub const fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Time anchor the next due time is computed from.
    #[must_use]
    pub const fn baseline_us(&self) -> u64 {
        self.baseline_us
    }

    /// Whether the item is in the schedule list.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Delay statistics.
    #[must_use]
    pub const fn stats(&self) -> &WorkItemStats {
        &self.stats
    }

    /// Absolute time of the next firing.
    #[must_use]
    pub const fn next_due_us(&self) -> u64 {
        self.baseline_us.saturating_add(self.period_us)
    }

    /// Whether a full period has elapsed since the baseline.
    #[must_use]
    pub const fn is_due(&self, now_us: u64) -> bool {
        now_us.saturating_sub(self.baseline_us) >= self.period_us
    }

    pub(crate) fn activate(&mut self, now_us: u64) {
        self.baseline_us = now_us;
        self.stats.reset();
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub(crate) fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Account for a firing at `now_us` if the item is due.
    ///
    /// Advances the baseline by exactly one period and hands back the
    /// callback so it can be invoked after the queue lock is dropped.
    pub(crate) fn fire_if_due(
        &mut self,
        now_us: u64,
        index: usize,
        dump_interval: u64,
    ) -> Option<Arc<dyn WorkCallback>> {
        if !self.is_due(now_us) {
            return None;
        }

        self.stats.update(now_us, self.baseline_us);
        if self.stats.dump_due(dump_interval) {
            self.stats.dump(index);
        }

        self.baseline_us = self.next_due_us();
        self.active = true;

        Some(Arc::clone(&self.callback))
    }
}
