//! Stepper driver implementations

pub mod four_phase;

pub use four_phase::{step_interval_us, FourPhaseStepper, PHASES};
