//! Ordered list of scheduled work item handles with stable traversal cursors.
//!
//! The tick loop walks this list while periodically dropping the queue lock
//! to run callbacks. Other threads (or the callbacks themselves) may erase or
//! append entries in that window, so the list guarantees:
//!
//! - while a traversal is open, [`ScheduleList::erase`] leaves a tombstone
//!   instead of shifting later entries, so every outstanding [`Cursor`] keeps
//!   pointing at the same logical position and [`ScheduleList::next`] skips
//!   removed entries;
//! - entries appended mid-traversal are visited by the same traversal;
//! - [`ScheduleList::clear`] bumps an epoch, after which every outstanding
//!   cursor is exhausted.
//!
//! Tombstones are compacted when the last open traversal ends.

use super::work_item::WorkItemHandle;

/// Position in a [`ScheduleList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: usize,
    epoch: u64,
}

/// Ordered sequence of scheduled handles.
#[derive(Debug, Default)]
pub struct ScheduleList {
    entries: Vec<Option<WorkItemHandle>>,
    live: usize,
    traversals: usize,
    epoch: u64,
}

impl ScheduleList {
    /// Empty list with preallocated room.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of live entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether there are no live entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Append at the tail.
    pub fn push(&mut self, handle: WorkItemHandle) {
        self.entries.push(Some(handle));
        self.live += 1;
    }

    /// First live entry.
    #[must_use]
    pub fn first(&self) -> Option<Cursor> {
        self.seek(0)
    }

    /// Live entry after `cursor`, or `None` at the end or after a clear.
    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Option<Cursor> {
        if cursor.epoch != self.epoch {
            return None;
        }
        self.seek(cursor.pos + 1)
    }

    /// Handle at `cursor`; `None` if it was erased or the list was cleared.
    #[must_use]
    pub fn get(&self, cursor: Cursor) -> Option<WorkItemHandle> {
        if cursor.epoch != self.epoch {
            return None;
        }
        self.entries.get(cursor.pos).copied().flatten()
    }

    /// Cursor of the first entry equal to `handle`.
    #[must_use]
    pub fn position(&self, handle: WorkItemHandle) -> Option<Cursor> {
        let mut cursor = self.first();
        while let Some(current) = cursor {
            if self.get(current) == Some(handle) {
                return Some(current);
            }
            cursor = self.next(current);
        }
        None
    }

    /// Remove the entry at `cursor`. Returns the removed handle.
    ///
    /// Cursors remain valid: during a traversal the slot is tombstoned,
    /// otherwise no cursor can be outstanding and the entry is removed outright.
    pub fn erase(&mut self, cursor: Cursor) -> Option<WorkItemHandle> {
        if cursor.epoch != self.epoch {
            return None;
        }
        let removed = if self.traversals > 0 {
            self.entries.get_mut(cursor.pos).and_then(Option::take)
        } else if cursor.pos < self.entries.len() {
            self.entries.remove(cursor.pos)
        } else {
            None
        };
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Drop every entry and invalidate outstanding cursors.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.live = 0;
        self.epoch += 1;
    }

    /// Open a traversal; erasures become tombstones until it ends.
    pub fn begin_traversal(&mut self) {
        self.traversals += 1;
    }

    /// Close a traversal, compacting tombstones once none remain open.
    pub fn end_traversal(&mut self) {
        self.traversals = self.traversals.saturating_sub(1);
        if self.traversals == 0 && self.entries.len() != self.live {
            self.entries.retain(Option::is_some);
        }
    }

    /// Live handles in order.
    pub fn iter(&self) -> impl Iterator<Item = WorkItemHandle> + '_ {
        self.entries.iter().filter_map(|entry| *entry)
    }

    fn seek(&self, from: usize) -> Option<Cursor> {
        self.entries
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, entry)| entry.is_some())
            .map(|(pos, _)| Cursor {
                pos,
                epoch: self.epoch,
            })
    }
}
