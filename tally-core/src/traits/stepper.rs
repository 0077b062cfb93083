//! Stepper actuator trait
//!
//! This trait abstracts over coil-driven stepper implementations
//! (GPIO-driven unipolar motors, driver ICs, host doubles).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Positive step count
    Forward,
    /// Negative step count
    Backward,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Direction of a signed step count
    ///
    /// Zero counts as forward; moving zero steps does nothing either way.
    pub fn of_steps(steps: i32) -> Self {
        if steps < 0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// A coil output could not be driven
    PinFault,
    /// Invalid configuration (zero speed or zero steps per revolution)
    InvalidConfig,
}

/// Trait for coil-driven stepper actuators
///
/// A move is blocking from the caller's point of view: the returned future
/// resolves only after the last step. Coils stay energized after a move
/// (holding torque) until [`CoilStepper::release`] is called.
pub trait CoilStepper {
    /// Move by a signed number of steps
    ///
    /// Positive counts move [`Direction::Forward`], negative counts
    /// [`Direction::Backward`], at the speed fixed at construction.
    fn step(&mut self, steps: i32) -> impl core::future::Future<Output = Result<(), StepperError>>;

    /// De-energize every coil output
    fn release(&mut self) -> Result<(), StepperError>;

    /// Check if any coil output is currently driven
    fn is_energized(&self) -> bool;
}
