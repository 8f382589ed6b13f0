//! Cooperative shutdown flag shared between a work queue and its drivers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable stop flag. All clones observe the same state.
///
/// The tick loop samples it between schedule-list entries, never in the
/// middle of a callback.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a clear signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every observer to stop. Returns `true` if this call set the flag.
    pub fn request(&self) -> bool {
        !self.requested.swap(true, Ordering::AcqRel)
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Clear the flag so the queue can be driven again.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }
}
