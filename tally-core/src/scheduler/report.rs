//! Outcome reports from the counting core
//!
//! The core never logs. It hands back what it did and what went wrong,
//! and the caller decides how to report it.

use heapless::Vec;
use tally_hal::StoreError;

use crate::state::{Trigger, TRIGGER_COUNT};
use crate::traits::{DisplayError, Snapshot, StepperError};

/// Most faults one handler can raise (store, then display)
pub const MAX_HANDLER_FAULTS: usize = 2;

/// Recoverable failure inside a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Lifetime cell could not be read or written
    Store(StoreError),
    /// Snapshot did not reach the display
    Display(DisplayError),
    /// An indexing move failed; actuators were still released
    Motion(StepperError),
}

/// Startup failure that must keep the counting loop from running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// Display did not accept the greeting or the first snapshot
    Display(DisplayError),
}

/// Result of a successful start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Boot {
    /// First snapshot shown
    pub snapshot: Snapshot,
    /// Lifetime cell read failure; the count starts from 0 on screen
    pub fault: Option<Fault>,
}

/// One handler run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handled {
    /// Trigger whose flag was consumed
    pub trigger: Trigger,
    /// Snapshot pushed to the display, if the handler pushes one
    pub snapshot: Option<Snapshot>,
    /// Recoverable faults, in the order they happened
    pub faults: Vec<Fault, MAX_HANDLER_FAULTS>,
}

impl Handled {
    pub(crate) fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            snapshot: None,
            faults: Vec::new(),
        }
    }

    pub(crate) fn fault(&mut self, fault: Fault) {
        // Each handler raises at most one fault per kind
        let _ = self.faults.push(fault);
    }

    /// Check if the handler ran without faults
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Everything one scheduling tick did
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Handlers run this tick, in dispatch order
    pub handled: Vec<Handled, TRIGGER_COUNT>,
}

impl Tick {
    /// Check if nothing was pending
    pub fn is_idle(&self) -> bool {
        self.handled.is_empty()
    }

    /// Triggers handled this tick, in dispatch order
    pub fn triggers(&self) -> impl Iterator<Item = Trigger> + '_ {
        self.handled.iter().map(|h| h.trigger)
    }

    /// Check if a trigger was handled this tick
    pub fn handled(&self, trigger: Trigger) -> bool {
        self.triggers().any(|t| t == trigger)
    }

    /// Every fault raised this tick, with the trigger that raised it
    pub fn faults(&self) -> impl Iterator<Item = (Trigger, Fault)> + '_ {
        self.handled
            .iter()
            .flat_map(|h| h.faults.iter().map(move |&f| (h.trigger, f)))
    }

    /// Last snapshot pushed this tick
    pub fn last_snapshot(&self) -> Option<Snapshot> {
        self.handled.iter().rev().find_map(|h| h.snapshot)
    }
}
