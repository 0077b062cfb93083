//! Counting task
//!
//! Runs the counting core: a tick whenever a flag is pending, otherwise
//! sleep until an edge task signals.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

use tally_core::scheduler::{CountingCore, Tick};
use tally_drivers::display::Ssd1306Display;
use tally_drivers::stepper::FourPhaseStepper;
use tally_hal_rp2040::flash::Rp2040CellStore;

use crate::channels::{PENDING, TRIGGER_RAISED};

/// Coil-driven indexing actuator
pub type Actuator = FourPhaseStepper<Output<'static>, Delay>;

/// Count display on I2C0
pub type Display = Ssd1306Display<I2c<'static, I2C0, Async>>;

/// Counting core with the board's concrete collaborators
pub type Core = CountingCore<'static, Rp2040CellStore<'static>, Display, Actuator, Actuator, Delay>;

/// Drain pending flags forever
#[embassy_executor::task]
pub async fn counting_task(mut core: Core) {
    info!("Counting task started");

    loop {
        if !PENDING.any_pending() {
            TRIGGER_RAISED.wait().await;
        }

        let tick = core.poll().await;
        report(&tick);
    }
}

fn report(tick: &Tick) {
    for handled in tick.handled.iter() {
        match handled.snapshot {
            Some(s) => debug!(
                "{} handled: total={} box={}",
                handled.trigger, s.lifetime, s.in_box
            ),
            None => debug!("{} handled", handled.trigger),
        }
    }

    for (trigger, fault) in tick.faults() {
        warn!("{} fault: {}", trigger, fault);
    }
}
