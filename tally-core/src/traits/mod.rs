//! Hardware abstraction traits
//!
//! These traits define the interface between the counting logic
//! and hardware-specific implementations.

pub mod display;
pub mod stepper;

pub use display::{CountDisplay, DisplayError, Snapshot};
pub use stepper::{CoilStepper, Direction, StepperError};
