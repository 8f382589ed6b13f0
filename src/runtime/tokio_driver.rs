//! Tokio task that drives a [`WorkQueue`].
//!
//! Callbacks run inline on the driving task, so they should be short and
//! must not block; use [`super::TickDriver`] for callbacks that do real work.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::WorkQueue;

/// Spawn the driver loop on the current tokio runtime.
///
/// The task ends once the queue's shutdown signal is raised; call
/// [`WorkQueue::request_shutdown`] and await the handle to stop it.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn(queue: Arc<WorkQueue>) -> tokio::task::JoinHandle<()> {
    spawn_on(&tokio::runtime::Handle::current(), queue)
}

/// Spawn the driver loop on a specific runtime.
pub fn spawn_on(handle: &tokio::runtime::Handle, queue: Arc<WorkQueue>) -> tokio::task::JoinHandle<()> {
    handle.spawn(run(queue))
}

/// The driver loop itself, for callers that want to await it directly.
pub async fn run(queue: Arc<WorkQueue>) {
    let shutdown = queue.shutdown_signal();
    let idle_wakeup_us = queue.config().driver.idle_wakeup_us;
    let wakeup = Arc::clone(queue.wakeup());
    debug!("async work queue driver started");

    while !shutdown.is_requested() {
        let mut next_deadline_us = queue.now_us().saturating_add(idle_wakeup_us);
        queue.process_expired_work_items(&mut next_deadline_us);

        let sleep_us = next_deadline_us.saturating_sub(queue.now_us());
        if sleep_us == 0 {
            tokio::task::yield_now().await;
            continue;
        }
        if shutdown.is_requested() {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(Duration::from_micros(sleep_us)) => {}
            () = wakeup.notified() => {}
        }
    }

    debug!("async work queue driver stopped");
}
