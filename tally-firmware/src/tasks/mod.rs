//! Embassy async tasks
//!
//! Edge tasks only set flags; the counting task does the work.

pub mod counting;
pub mod trigger;

pub use counting::{counting_task, Core};
pub use trigger::{trigger_task, TRIGGER_TASKS};
