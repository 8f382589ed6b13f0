//! Generation-tagged slot table holding every registered work item.

use std::sync::Arc;

use tracing::trace;

use super::error::WorkQueueError;
use super::work_item::{WorkCallback, WorkItem, WorkItemHandle};

#[derive(Debug)]
struct Slot {
    generation: u64,
    item: Option<WorkItem>,
}

/// Flat table of work item slots addressed by index.
///
/// Scheduling never shrinks the table. Releasing a registration empties its
/// slot and queues the index for reuse; the next registration in that slot
/// gets a new generation, so handles to the old registration stay stale.
/// Generations come from a table-wide counter that survives [`Registry::clear`].
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
    next_generation: u64,
    max_items: Option<usize>,
}

impl Registry {
    /// Empty registry with room for `capacity` slots before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize, max_items: Option<usize>) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            next_generation: 0,
            max_items,
        }
    }

    /// Number of slots, occupied or not. An index is valid iff it is below this.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently holding an item.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Store a new inactive item and return its handle.
    ///
    /// # Errors
    ///
    /// - `WorkQueueError::InvalidPeriod` if `period_us` is zero
    /// - `WorkQueueError::CapacityExceeded` if `max_items` items are registered
    pub fn insert(
        &mut self,
        period_us: u64,
        callback: Arc<dyn WorkCallback>,
    ) -> Result<WorkItemHandle, WorkQueueError> {
        if period_us == 0 {
            return Err(WorkQueueError::InvalidPeriod);
        }
        if let Some(max) = self.max_items {
            if self.occupied() >= max {
                return Err(WorkQueueError::CapacityExceeded { max });
            }
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        let item = WorkItem::new(period_us, callback);

        let index = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.generation = generation;
            slot.item = Some(item);
            index
        } else {
            self.slots.push(Slot {
                generation,
                item: Some(item),
            });
            self.slots.len() - 1
        };

        trace!(index = index, generation = generation, period_us = period_us, "work item registered");
        Ok(WorkItemHandle { index, generation })
    }

    /// Resolve a handle.
    ///
    /// # Errors
    ///
    /// `WorkQueueError::StaleHandle` if the index is out of bounds, the slot
    /// is empty, or it belongs to another registration.
    pub fn get(&self, handle: WorkItemHandle) -> Result<&WorkItem, WorkQueueError> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.item.as_ref())
            .ok_or_else(|| stale(handle))
    }

    /// Resolve a handle mutably.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::get`].
    pub fn get_mut(&mut self, handle: WorkItemHandle) -> Result<&mut WorkItem, WorkQueueError> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.item.as_mut())
            .ok_or_else(|| stale(handle))
    }

    /// Empty the slot behind `handle` and recycle its index.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::get`].
    pub fn remove(&mut self, handle: WorkItemHandle) -> Result<WorkItem, WorkQueueError> {
        let item = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.item.take())
            .ok_or_else(|| stale(handle))?;
        self.free.push(handle.index);
        trace!(index = handle.index, generation = handle.generation, "work item released");
        Ok(item)
    }

    /// Drop every slot. Generations keep counting up.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

const fn stale(handle: WorkItemHandle) -> WorkQueueError {
    WorkQueueError::StaleHandle {
        index: handle.index,
        generation: handle.generation,
    }
}
