//! Pending-event flags shared between edge handlers and the counting loop
//!
//! Edge handlers only ever set a flag; the counting loop reads it, runs
//! the handler, and clears it afterwards. A flag that is already set
//! absorbs further edges, so repeated triggers coalesce into one action.

use portable_atomic::{AtomicBool, Ordering};

use super::events::{Trigger, TRIGGER_COUNT};

/// One lock-free flag per trigger line
///
/// Lives in a `static` on the target; edge handlers hold an [`EdgeLatch`]
/// and the counting loop holds a shared reference.
#[derive(Debug)]
pub struct PendingEvents {
    flags: [AtomicBool; TRIGGER_COUNT],
}

impl Default for PendingEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingEvents {
    /// Create a set of flags with nothing pending
    pub const fn new() -> Self {
        Self {
            flags: [
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ],
        }
    }

    /// Mark a trigger as pending
    ///
    /// Plain store, no read-modify-write: safe from an interrupt context on
    /// cores without compare-and-swap.
    pub fn raise(&self, trigger: Trigger) {
        self.flags[trigger.index()].store(true, Ordering::Release);
    }

    /// Check if a trigger is pending
    pub fn is_pending(&self, trigger: Trigger) -> bool {
        self.flags[trigger.index()].load(Ordering::Acquire)
    }

    /// Clear a trigger once its handler has finished
    pub fn clear(&self, trigger: Trigger) {
        self.flags[trigger.index()].store(false, Ordering::Release);
    }

    /// Check if any trigger is pending
    pub fn any_pending(&self) -> bool {
        Trigger::PRIORITY.iter().any(|&t| self.is_pending(t))
    }

    /// Get a latch that can only raise `trigger`
    pub const fn latch(&self, trigger: Trigger) -> EdgeLatch<'_> {
        EdgeLatch {
            events: self,
            trigger,
        }
    }
}

/// Raise-only handle for a single trigger line
///
/// This is all an edge handler gets: it cannot clear flags or reach the
/// counter, indexer or display.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLatch<'a> {
    events: &'a PendingEvents,
    trigger: Trigger,
}

impl EdgeLatch<'_> {
    /// Record a rising edge
    pub fn fire(&self) {
        self.events.raise(self.trigger);
    }

    /// Trigger this latch raises
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}
