//! Monotonic per-kind id allocation
//!
//! Each record kind that carries a numeric id (hives, tasks) owns one
//! [`SequenceAllocator`]. The allocator hands out ids in increasing order and
//! is rebased while loading so that ids survive restarts:
//!
//! - `observe(id)` for every decoded record: counter = max(counter, id + 1)
//! - `observe_hint(next)` for the persisted `NEXT_<KIND>_ID:` line:
//!   counter = max(counter, next)
//!
//! A stale or missing hint line therefore never causes a collision, and a
//! hint larger than any record id is honoured.
//!
//! Allocators are plain values owned by whoever needs them (the store owns
//! one per kind). There is no global counter, so independent stores never
//! interfere.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// First id handed out by a fresh allocator
pub const FIRST_ID: u32 = 1;

/// Thread-safe monotonic id counter
#[derive(Debug)]
pub struct SequenceAllocator {
    /// The id the next call to `next()` returns
    next: AtomicU32,
}

impl SequenceAllocator {
    /// Create an allocator starting at [`FIRST_ID`]
    pub fn new() -> Self {
        Self::starting_at(FIRST_ID)
    }

    /// Create an allocator whose first id is `next`
    pub fn starting_at(next: u32) -> Self {
        Self {
            next: AtomicU32::new(next),
        }
    }

    /// Return the current counter and advance it
    ///
    /// # Errors
    ///
    /// Returns a validation error once the 32-bit id space is exhausted.
    /// The counter is left unchanged in that case, so no id is ever repeated.
    pub fn next(&self) -> Result<u32> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(1)
            })
            .map_err(|_| Error::validation("id sequence exhausted"))
    }

    /// Rebase past an id that already exists
    pub fn observe(&self, id: u32) {
        self.next.fetch_max(id.saturating_add(1), Ordering::AcqRel);
    }

    /// Rebase to a persisted next-id hint
    pub fn observe_hint(&self, next: u32) {
        self.next.fetch_max(next, Ordering::AcqRel);
    }

    /// The id the next call to `next()` would return
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Acquire)
    }
}

impl Default for SequenceAllocator {
    fn default() -> Self {
        Self::new()
    }
}
