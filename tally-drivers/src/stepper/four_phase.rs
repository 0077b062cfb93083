//! 4-wire unipolar stepper on four GPIO coil lines
//!
//! Drives a geared 28BYJ-48 style motor through a ULN2003 darlington
//! array (or any driver that maps one GPIO to one coil) in full-step
//! mode.
//!
//! # Coil sequence
//!
//! | Phase | C1 | C2 | C3 | C4 |
//! |-------|----|----|----|----|
//! | 0     | 1  | 0  | 1  | 0  |
//! | 1     | 0  | 1  | 1  | 0  |
//! | 2     | 0  | 1  | 0  | 1  |
//! | 3     | 1  | 0  | 0  | 1  |
//!
//! Forward walks the table downwards, backward upwards. The wait comes
//! before each phase change, so a move of N steps takes N step intervals.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;
use tally_core::config::IndexerConfig;
use tally_core::traits::{CoilStepper, Direction, StepperError};

/// Coil pattern for each full-step phase
pub const PHASES: [[bool; 4]; 4] = [
    [true, false, true, false],
    [false, true, true, false],
    [false, true, false, true],
    [true, false, false, true],
];

/// Microseconds per minute
const US_PER_MINUTE: u32 = 60_000_000;

/// Step interval in microseconds for a speed in RPM
///
/// Returns `None` for a zero speed or a zero step count.
pub fn step_interval_us(steps_per_rev: u16, rpm: u16) -> Option<u32> {
    if steps_per_rev == 0 || rpm == 0 {
        return None;
    }
    Some(US_PER_MINUTE / u32::from(steps_per_rev) / u32::from(rpm))
}

/// Four-phase stepper driver
pub struct FourPhaseStepper<P, D> {
    coils: [P; 4],
    delay: D,
    interval_us: u32,
    /// Index into [`PHASES`] of the last pattern driven
    phase: usize,
    energized: bool,
}

impl<P, D> FourPhaseStepper<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create a driver and leave every coil off
    ///
    /// # Arguments
    /// - `coils`: the four coil outputs, in sequence order
    /// - `delay`: delay source for step timing
    /// - `steps_per_rev`: full steps per output shaft revolution
    /// - `rpm`: output shaft speed
    pub fn new(
        coils: [P; 4],
        delay: D,
        steps_per_rev: u16,
        rpm: u16,
    ) -> Result<Self, StepperError> {
        let interval_us =
            step_interval_us(steps_per_rev, rpm).ok_or(StepperError::InvalidConfig)?;

        let mut stepper = Self {
            coils,
            delay,
            interval_us,
            phase: 0,
            energized: true,
        };
        stepper.release()?;
        Ok(stepper)
    }

    /// Create a driver with the shared indexer speed settings
    pub fn from_config(coils: [P; 4], delay: D, config: &IndexerConfig) -> Result<Self, StepperError> {
        Self::new(coils, delay, config.steps_per_rev, config.rpm)
    }

    /// Time between phase changes
    pub fn interval_us(&self) -> u32 {
        self.interval_us
    }

    /// Current phase index
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Coil outputs
    pub fn coils(&self) -> &[P; 4] {
        &self.coils
    }

    fn next_phase(&self, direction: Direction) -> usize {
        match direction {
            Direction::Forward => (self.phase + 1) % PHASES.len(),
            Direction::Backward => (self.phase + PHASES.len() - 1) % PHASES.len(),
        }
    }

    fn drive(&mut self, pattern: [bool; 4]) -> Result<(), StepperError> {
        // Any partially written pattern still draws current
        self.energized = true;
        for (coil, on) in self.coils.iter_mut().zip(pattern) {
            coil.set_state(PinState::from(on))
                .map_err(|_| StepperError::PinFault)?;
        }
        Ok(())
    }
}

impl<P, D> CoilStepper for FourPhaseStepper<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    async fn step(&mut self, steps: i32) -> Result<(), StepperError> {
        let direction = Direction::of_steps(steps);

        for _ in 0..steps.unsigned_abs() {
            self.delay.delay_us(self.interval_us).await;
            let phase = self.next_phase(direction);
            self.drive(PHASES[phase])?;
            self.phase = phase;
        }

        Ok(())
    }

    fn release(&mut self) -> Result<(), StepperError> {
        let mut result = Ok(());
        // Keep going past a failed line so the others still turn off
        for coil in self.coils.iter_mut() {
            if coil.set_low().is_err() {
                result = Err(StepperError::PinFault);
            }
        }
        if result.is_ok() {
            self.energized = false;
        }
        result
    }

    fn is_energized(&self) -> bool {
        self.energized
    }
}
