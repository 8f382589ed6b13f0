//! Wake notifications from the work queue to whatever loop is driving it.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Edge-triggered wake signal.
///
/// The queue raises it when an item is scheduled or shutdown is requested,
/// so a driver sleeping until an older deadline re-evaluates immediately.
/// A notification that arrives while nobody waits is kept until the next wait.
#[derive(Debug, Default)]
pub struct Wakeup {
    pending: Mutex<bool>,
    condvar: Condvar,
    #[cfg(feature = "tokio-runtime")]
    notify: tokio::sync::Notify,
}

impl Wakeup {
    /// New wakeup with no pending notification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the current (or next) waiter.
    pub fn notify(&self) {
        let mut pending = self.pending.lock();
        *pending = true;
        self.condvar.notify_all();
        drop(pending);

        #[cfg(feature = "tokio-runtime")]
        self.notify.notify_one();
    }

    /// Block for at most `timeout`. Returns `true` if woken by a notification.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut pending = self.pending.lock();
        if !*pending {
            let _ = self.condvar.wait_for(&mut pending, timeout);
        }
        std::mem::replace(&mut *pending, false)
    }

    /// Async counterpart of [`Wakeup::wait_for`] without the timeout; pair it
    /// with `tokio::time::sleep` in a `select!`.
    #[cfg(feature = "tokio-runtime")]
    pub async fn notified(&self) {
        self.notify.notified().await;
        *self.pending.lock() = false;
    }
}
