//! Edge capture task
//!
//! One instance per trigger line. It does nothing but set the line's
//! pending flag and wake the counting task; all real work is deferred.

use defmt::*;
use embassy_rp::gpio::Input;

use tally_core::state::EdgeLatch;

use crate::channels::TRIGGER_RAISED;

/// Number of trigger lines; matches the task pool size
pub const TRIGGER_TASKS: usize = 4;

/// Watch one input line for rising edges
#[embassy_executor::task(pool_size = 4)]
pub async fn trigger_task(mut line: Input<'static>, latch: EdgeLatch<'static>) {
    debug!("Watching {} line", latch.trigger());

    loop {
        line.wait_for_rising_edge().await;
        latch.fire();
        TRIGGER_RAISED.signal(());
        trace!("{} edge", latch.trigger());
    }
}
