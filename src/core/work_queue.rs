//! The work queue: registry, schedule list and tick processing under one lock.
//!
//! # Lock discipline
//!
//! A single `parking_lot::Mutex` guards the registry, the schedule list and
//! every item's timing state. Every public method holds it for its whole body
//! except [`WorkQueue::process_expired_work_items`], which releases it around
//! each callback invocation. Callbacks may therefore call back into the queue
//! (schedule, unschedule, register, release, even finalize) without
//! deadlocking, and a slow callback never blocks other threads' API calls.
//!
//! The traversal cursor stays valid across that unlocked window because the
//! schedule list tombstones erasures while a traversal is open.
//!
//! # Example
//!
//! ```rust
//! use prometheus_work_queue::core::WorkQueue;
//! use prometheus_work_queue::util::ManualClock;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let queue = WorkQueue::builder().clock(clock.clone()).build().unwrap();
//!
//! let handle = queue.register(Duration::from_millis(1), || {}).unwrap();
//! queue.schedule(handle).unwrap();
//!
//! clock.set(1_000);
//! let mut next = u64::MAX;
//! assert_eq!(queue.process_expired_work_items(&mut next), 1);
//! assert_eq!(next, 2_000);
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, trace};

use crate::builders::WorkQueueBuilder;
use crate::config::WorkQueueConfig;
use crate::util::clock::{duration_to_us, Clock};
use crate::util::shutdown::ShutdownSignal;

use super::error::WorkQueueError;
use super::registry::Registry;
use super::schedule_list::ScheduleList;
use super::stats::WorkItemStats;
use super::wakeup::Wakeup;
use super::work_item::{WorkCallback, WorkItemHandle};

/// State guarded by the queue lock.
#[derive(Debug)]
struct QueueState {
    registry: Registry,
    schedule: ScheduleList,
}

/// Outcome of examining one schedule-list entry under the lock.
enum Visit {
    /// Entry no longer resolves to a live item.
    Dangling(WorkQueueError),
    /// Item was not due.
    Idle,
    /// Item was due; run this callback unlocked.
    Fire(Arc<dyn WorkCallback>),
}

/// Periodic work queue.
///
/// An explicit context object: create one per independent set of periodic
/// callbacks and share it with `Arc`. Nothing is process-global.
pub struct WorkQueue {
    state: Mutex<QueueState>,
    clock: Arc<dyn Clock>,
    shutdown: ShutdownSignal,
    wakeup: Arc<Wakeup>,
    config: WorkQueueConfig,
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("config", &self.config)
            .field("shutdown", &self.shutdown.is_requested())
            .finish_non_exhaustive()
    }
}

impl WorkQueue {
    /// Start building a queue.
    #[must_use]
    pub fn builder() -> WorkQueueBuilder {
        WorkQueueBuilder::new()
    }

    /// Queue with the given configuration and a real monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::InvalidConfig` if the configuration is invalid.
    pub fn new(config: WorkQueueConfig) -> Result<Self, WorkQueueError> {
        Self::builder().config(config).build()
    }

    pub(crate) fn from_parts(
        config: WorkQueueConfig,
        clock: Arc<dyn Clock>,
        shutdown: ShutdownSignal,
    ) -> Self {
        let state = QueueState {
            registry: Registry::with_capacity(config.initial_capacity, config.max_items),
            schedule: ScheduleList::with_capacity(config.initial_capacity),
        };
        Self {
            state: Mutex::new(state),
            clock,
            shutdown,
            wakeup: Arc::new(Wakeup::new()),
            config,
        }
    }

    /// Configuration the queue was built with.
    #[must_use]
    pub const fn config(&self) -> &WorkQueueConfig {
        &self.config
    }

    /// The queue's time source.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current time on the queue's clock.
    #[must_use]
    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Wake signal raised on scheduling and shutdown.
    #[must_use]
    pub fn wakeup(&self) -> &Arc<Wakeup> {
        &self.wakeup
    }

    /// A clone of the shutdown signal sampled by tick processing.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Stop tick processing at the next entry boundary and wake any driver.
    pub fn request_shutdown(&self) {
        if self.shutdown.request() {
            debug!("work queue shutdown requested");
        }
        self.wakeup.notify();
    }

    /// Register a callback to run every `period`. The item starts unscheduled.
    ///
    /// # Errors
    ///
    /// - `WorkQueueError::InvalidPeriod` if `period` is under one microsecond
    /// - `WorkQueueError::CapacityExceeded` if `max_items` is reached
    pub fn register<F>(&self, period: Duration, callback: F) -> Result<WorkItemHandle, WorkQueueError>
    where
        F: WorkCallback,
    {
        let period_us = duration_to_us(period);
        self.state.lock().registry.insert(period_us, Arc::new(callback))
    }

    /// Register and immediately schedule.
    ///
    /// # Errors
    ///
    /// Same as [`WorkQueue::register`].
    pub fn register_scheduled<F>(
        &self,
        period: Duration,
        callback: F,
    ) -> Result<WorkItemHandle, WorkQueueError>
    where
        F: WorkCallback,
    {
        let handle = self.register(period, callback)?;
        self.schedule(handle)?;
        Ok(handle)
    }

    /// Whether `index` addresses a registry slot.
    #[must_use]
    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.state.lock().registry.len()
    }

    /// Whether `handle` refers to a live registration.
    #[must_use]
    pub fn is_valid(&self, handle: WorkItemHandle) -> bool {
        self.state.lock().registry.get(handle).is_ok()
    }

    /// Whether `handle` is live and currently scheduled.
    #[must_use]
    pub fn is_scheduled(&self, handle: WorkItemHandle) -> bool {
        self.state
            .lock()
            .registry
            .get(handle)
            .is_ok_and(super::work_item::WorkItem::is_active)
    }

    /// Number of registry slots (see [`WorkQueue::is_valid_index`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Whether the registry has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().registry.is_empty()
    }

    /// Number of scheduled items.
    #[must_use]
    pub fn scheduled_len(&self) -> usize {
        self.state.lock().schedule.len()
    }

    /// Period of a registered item in microseconds.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn period_us(&self, handle: WorkItemHandle) -> Result<u64, WorkQueueError> {
        Ok(self.state.lock().registry.get(handle)?.period_us())
    }

    /// Baseline time of a registered item in microseconds.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn baseline_us(&self, handle: WorkItemHandle) -> Result<u64, WorkQueueError> {
        Ok(self.state.lock().registry.get(handle)?.baseline_us())
    }

    /// Snapshot of an item's delay statistics.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn stats(&self, handle: WorkItemHandle) -> Result<WorkItemStats, WorkQueueError> {
        Ok(*self.state.lock().registry.get(handle)?.stats())
    }

    /// Reset an item's delay statistics to the neutral state.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn reset_stats(&self, handle: WorkItemHandle) -> Result<(), WorkQueueError> {
        self.state.lock().registry.get_mut(handle)?.reset_stats();
        Ok(())
    }

    /// Add an item to the schedule list with its baseline set to now.
    ///
    /// Scheduling an already scheduled item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn schedule(&self, handle: WorkItemHandle) -> Result<(), WorkQueueError> {
        let now_us = self.clock.now_us();
        {
            let mut state = self.state.lock();
            let item = state.registry.get_mut(handle)?;
            if item.is_active() {
                trace!(index = handle.index, "work item already scheduled");
                return Ok(());
            }
            item.activate(now_us);
            state.schedule.push(handle);
        }
        debug!(index = handle.index, baseline_us = now_us, "work item scheduled");
        self.wakeup.notify();
        Ok(())
    }

    /// Remove an item from the schedule list and mark it inactive.
    ///
    /// Returns `Ok(false)` if the item was not scheduled.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn unschedule(&self, handle: WorkItemHandle) -> Result<bool, WorkQueueError> {
        let mut state = self.state.lock();
        state.registry.get(handle)?;
        Ok(Self::unschedule_locked(&mut state, handle))
    }

    /// Unschedule if needed, then free the slot for reuse.
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::StaleHandle` if the handle is not live.
    pub fn release(&self, handle: WorkItemHandle) -> Result<(), WorkQueueError> {
        let mut state = self.state.lock();
        state.registry.get(handle)?;
        Self::unschedule_locked(&mut state, handle);
        state.registry.remove(handle)?;
        Ok(())
    }

    /// Drop every registration and schedule entry.
    ///
    /// Handles issued before this call are stale afterwards and every index
    /// is invalid until new items are registered. Safe to call from a callback.
    pub fn finalize(&self) {
        let mut state = self.state.lock();
        state.schedule.clear();
        state.registry.clear();
        debug!("work queue finalized");
    }

    /// Fire every due item and lower `next_deadline_us` to the earliest
    /// upcoming due time among scheduled items.
    ///
    /// `next_deadline_us` is the caller's current wakeup estimate; it is only
    /// ever lowered. Returns the number of callbacks invoked.
    pub fn process_expired_work_items(&self, next_deadline_us: &mut u64) -> usize {
        trace!(next_deadline_us = *next_deadline_us, "processing expired work items");
        let dump_interval = self.config.stats_dump_interval;
        let mut fired = 0;

        let mut state = self.state.lock();
        state.schedule.begin_traversal();

        let mut cursor = state.schedule.first();
        while let Some(pos) = cursor {
            if self.shutdown.is_requested() {
                debug!("shutdown observed, stopping tick traversal");
                break;
            }

            let Some(handle) = state.schedule.get(pos) else {
                cursor = state.schedule.next(pos);
                continue;
            };

            let now_us = self.clock.now_us();
            let visit = match state.registry.get_mut(handle) {
                Ok(item) => item
                    .fire_if_due(now_us, handle.index, dump_interval)
                    .map_or(Visit::Idle, Visit::Fire),
                Err(e) => Visit::Dangling(e),
            };

            match visit {
                Visit::Dangling(e) => {
                    error!(index = handle.index, error = %e, "schedule entry does not resolve, dropping it");
                    state.schedule.erase(pos);
                }
                Visit::Idle => {}
                Visit::Fire(callback) => {
                    trace!(index = handle.index, now_us = now_us, "firing work item");
                    fired += 1;
                    MutexGuard::unlocked(&mut state, || invoke(handle, callback.as_ref()));
                }
            }

            if let Ok(item) = state.registry.get(handle) {
                if item.is_active() {
                    *next_deadline_us = (*next_deadline_us).min(item.next_due_us());
                }
            }

            cursor = state.schedule.next(pos);
        }

        state.schedule.end_traversal();
        drop(state);

        trace!(fired = fired, next_deadline_us = *next_deadline_us, "tick complete");
        fired
    }

    /// Scan the schedule list for `handle`, erase the first match and
    /// deactivate the item.
    fn unschedule_locked(state: &mut QueueState, handle: WorkItemHandle) -> bool {
        let Some(pos) = state.schedule.position(handle) else {
            debug!(index = handle.index, "unschedule: work item not scheduled");
            return false;
        };

        match state.registry.get_mut(handle) {
            Ok(item) => {
                item.deactivate();
                state.schedule.erase(pos);
                debug!(index = handle.index, "work item unscheduled");
                true
            }
            Err(e) => {
                error!(index = handle.index, error = %e, "unschedule: schedule entry does not resolve");
                false
            }
        }
    }
}

/// Run a callback, containing any panic so the tick loop survives it.
fn invoke(handle: WorkItemHandle, callback: &dyn WorkCallback) {
    if catch_unwind(AssertUnwindSafe(|| callback.call())).is_err() {
        error!(index = handle.index, generation = handle.generation, "work item callback panicked");
    }
}
