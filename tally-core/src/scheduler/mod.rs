//! Counting core scheduler
//!
//! Drains pending trigger flags once per tick and reports what it did.

pub mod dispatcher;
pub mod report;

pub use dispatcher::{CoreSettings, CountingCore};
pub use report::{Boot, Fault, Handled, StartupError, Tick, MAX_HANDLER_FAULTS};
