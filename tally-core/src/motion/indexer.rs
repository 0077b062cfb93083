//! Two-actuator indexing sequence
//!
//! One run per incoming part: actuator A nudges the part back and forth to
//! seat it, then actuator B advances the feed by one slot. Both actuators
//! move one eighth of a revolution per move.

use embedded_hal_async::delay::DelayNs;

use crate::config::IndexerConfig;
use crate::traits::{CoilStepper, StepperError};

/// Fraction of a revolution covered by one indexing move
pub const TRAVEL_DIVISOR: u16 = 8;

/// Fixed geometry and timing of an indexing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndexPlan {
    /// Steps per output revolution (same for both actuators)
    pub steps_per_rev: u16,
    /// Pause between the backward and forward nudge, in ms
    pub settle_ms: u32,
}

impl IndexPlan {
    /// Steps per indexing move
    pub fn travel(&self) -> i32 {
        i32::from(self.steps_per_rev / TRAVEL_DIVISOR)
    }
}

impl From<&IndexerConfig> for IndexPlan {
    fn from(config: &IndexerConfig) -> Self {
        Self {
            steps_per_rev: config.steps_per_rev,
            settle_ms: config.settle_ms,
        }
    }
}

/// Owner of both indexing actuators
pub struct Indexer<A, B, T> {
    nudge: A,
    feeder: B,
    delay: T,
    plan: IndexPlan,
}

impl<A, B, T> Indexer<A, B, T>
where
    A: CoilStepper,
    B: CoilStepper,
    T: DelayNs,
{
    /// Create an indexer from actuator A (nudge), actuator B (feeder)
    /// and a delay source
    pub fn new(nudge: A, feeder: B, delay: T, plan: IndexPlan) -> Self {
        Self {
            nudge,
            feeder,
            delay,
            plan,
        }
    }

    /// Run one complete indexing sequence
    ///
    /// 1. A backward by one travel
    /// 2. settle
    /// 3. A forward by one travel
    /// 4. release A
    /// 5. B forward by one travel
    /// 6. release B
    ///
    /// Both actuators are de-energized when this returns, whether the
    /// sequence finished or a move failed. Dropping the future part way
    /// through releases them as well.
    pub async fn advance(&mut self) -> Result<(), StepperError> {
        let travel = self.plan.travel();
        let settle_ms = self.plan.settle_ms;
        let mut held = Energized {
            nudge: &mut self.nudge,
            feeder: &mut self.feeder,
        };

        held.nudge.step(-travel).await?;
        self.delay.delay_ms(settle_ms).await;
        held.nudge.step(travel).await?;
        held.nudge.release()?;

        held.feeder.step(travel).await?;
        held.feeder.release()?;

        Ok(())
    }

    /// Check that neither actuator is drawing current
    pub fn is_released(&self) -> bool {
        !self.nudge.is_energized() && !self.feeder.is_energized()
    }

    /// Indexing plan in effect
    pub fn plan(&self) -> IndexPlan {
        self.plan
    }

    /// Actuator A
    pub fn nudge(&self) -> &A {
        &self.nudge
    }

    /// Actuator B
    pub fn feeder(&self) -> &B {
        &self.feeder
    }
}

/// Releases whichever actuator is still energized when dropped
struct Energized<'a, A: CoilStepper, B: CoilStepper> {
    nudge: &'a mut A,
    feeder: &'a mut B,
}

impl<A: CoilStepper, B: CoilStepper> Drop for Energized<'_, A, B> {
    fn drop(&mut self) {
        if self.nudge.is_energized() {
            let _ = self.nudge.release();
        }
        if self.feeder.is_energized() {
            let _ = self.feeder.release();
        }
    }
}
