//! State shared between the edge tasks and the counting task
//!
//! The pending flags are the source of truth. The signal only wakes the
//! counting task so it does not have to spin while nothing is pending.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use tally_core::state::PendingEvents;

/// One pending flag per trigger line
pub static PENDING: PendingEvents = PendingEvents::new();

/// Raised after an edge task sets a flag
pub static TRIGGER_RAISED: Signal<CriticalSectionRawMutex, ()> = Signal::new();
