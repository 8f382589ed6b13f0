//! Dedicated OS thread that drives a [`WorkQueue`].
//!
//! The loop is the classic high-resolution work queue pump: start each pass
//! with "wake me after the idle interval", let tick processing lower that
//! deadline to the earliest scheduled item, then sleep until the deadline or
//! until the queue signals that something new was scheduled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::core::{WorkQueue, WorkQueueError};

/// Handle to a running driver thread.
///
/// Call [`TickDriver::stop`] for a graceful shutdown. Dropping the handle
/// requests shutdown but does not join the thread.
#[derive(Debug)]
pub struct TickDriver {
    queue: Arc<WorkQueue>,
    ticks: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Spawn the driver thread configured by the queue's `DriverConfig`.
    ///
    /// The driver stops when the queue's shutdown signal is raised, either
    /// through [`TickDriver::stop`] or [`WorkQueue::request_shutdown`].
    ///
    /// # Errors
    ///
    /// Returns `WorkQueueError::DriverSpawn` if the OS refuses the thread.
    pub fn spawn(queue: Arc<WorkQueue>) -> Result<Self, WorkQueueError> {
        let driver_cfg = queue.config().driver.clone();
        let ticks = Arc::new(AtomicU64::new(0));

        let thread = {
            let queue = Arc::clone(&queue);
            let ticks = Arc::clone(&ticks);
            let idle_wakeup_us = driver_cfg.idle_wakeup_us;
            thread::Builder::new()
                .name(driver_cfg.thread_name.clone())
                .stack_size(driver_cfg.thread_stack_size)
                .spawn(move || run(&queue, &ticks, idle_wakeup_us))
                .map_err(|e| WorkQueueError::DriverSpawn(e.to_string()))?
        };

        info!(
            thread_name = %driver_cfg.thread_name,
            idle_wakeup_us = driver_cfg.idle_wakeup_us,
            "work queue driver started"
        );

        Ok(Self {
            queue,
            ticks,
            thread: Some(thread),
        })
    }

    /// Number of completed tick passes.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Whether the driver thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Request shutdown and wait for the thread to exit.
    ///
    /// An in-flight callback always runs to completion first.
    pub fn stop(mut self) {
        self.queue.request_shutdown();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("work queue driver thread panicked");
            }
        }
        info!(ticks = self.ticks(), "work queue driver stopped");
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.queue.request_shutdown();
            debug!("TickDriver dropped without explicit stop - thread will be detached");
        }
    }
}

fn run(queue: &WorkQueue, ticks: &AtomicU64, idle_wakeup_us: u64) {
    let shutdown = queue.shutdown_signal();
    debug!("work queue driver loop entered");

    while !shutdown.is_requested() {
        let mut next_deadline_us = queue.now_us().saturating_add(idle_wakeup_us);
        queue.process_expired_work_items(&mut next_deadline_us);
        ticks.fetch_add(1, Ordering::Relaxed);

        let sleep_us = next_deadline_us.saturating_sub(queue.now_us());
        if sleep_us > 0 && !shutdown.is_requested() {
            queue.wakeup().wait_for(Duration::from_micros(sleep_us));
        }
    }

    debug!("work queue driver loop exiting");
}
