//! Tally - Parts Counting Workstation Firmware
//!
//! Main firmware binary for RP2040-based counting workstations. Counts
//! parts into a box, keeps a lifetime tally in flash, and runs a
//! two-stepper indexer for every incoming part.
//!
//! # Board wiring (Pico)
//!
//! | Function            | GPIO            |
//! |---------------------|-----------------|
//! | Count part          | 2               |
//! | Reset box           | 3               |
//! | Reset lifetime      | 6               |
//! | Part incoming       | 7               |
//! | OLED SDA / SCL      | 4 / 5 (I2C0)    |
//! | Actuator A coils    | 8, 10, 9, 11    |
//! | Actuator B coils    | 12, 14, 13, 15  |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use tally_core::counter::LifetimeCounter;
use tally_core::motion::{IndexPlan, Indexer};
use tally_core::scheduler::{CoreSettings, CountingCore, StartupError};
use tally_core::state::{Trigger, TRIGGER_COUNT};
use tally_drivers::display::Ssd1306Display;
use tally_drivers::stepper::FourPhaseStepper;
use tally_hal_rp2040::flash::Rp2040CellStore;

use crate::channels::PENDING;

mod channels;
mod config;
mod tasks;

// Every trigger line needs its own edge task
const _: () = core::assert!(tasks::TRIGGER_TASKS == TRIGGER_COUNT);

/// OLED bus speed
const I2C_FREQUENCY: u32 = 400_000;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tally firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    info!(
        "Indexer: {} steps/rev at {} rpm, settle {} ms",
        config.indexer.steps_per_rev, config.indexer.rpm, config.indexer.settle_ms
    );
    info!(
        "Counter: cell {}, debounce {} ms, overflow {}",
        config.counter.address, config.counter.debounce_ms, config.counter.overflow
    );

    // Count display on I2C0
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let bus = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);
    let mut display = Ssd1306Display::new(bus, config.display.i2c_address);
    if let Err(e) = display.init().await {
        fatal(StartupError::Display(e));
    }
    info!("Display initialized at {=u8:#x}", config.display.i2c_address);

    // Indexing actuators, coils listed in sequence order
    let nudge = FourPhaseStepper::from_config(
        [
            Output::new(p.PIN_8, Level::Low),
            Output::new(p.PIN_10, Level::Low),
            Output::new(p.PIN_9, Level::Low),
            Output::new(p.PIN_11, Level::Low),
        ],
        Delay,
        &config.indexer,
    );
    let feeder = FourPhaseStepper::from_config(
        [
            Output::new(p.PIN_12, Level::Low),
            Output::new(p.PIN_14, Level::Low),
            Output::new(p.PIN_13, Level::Low),
            Output::new(p.PIN_15, Level::Low),
        ],
        Delay,
        &config.indexer,
    );
    let (nudge, feeder) = match (nudge, feeder) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => defmt::panic!("Stepper setup failed: {}", e),
    };
    debug!("Step interval {} us", nudge.interval_us());
    let indexer = Indexer::new(nudge, feeder, Delay, IndexPlan::from(&config.indexer));

    // Lifetime count in the flash cell partition
    let store = Rp2040CellStore::new(p.FLASH, p.DMA_CH0);
    let counter = LifetimeCounter::from_config(store, &config.counter);

    let mut counting: tasks::Core = CountingCore::new(
        &PENDING,
        counter,
        indexer,
        display,
        Delay,
        CoreSettings::from(&config),
    );

    match counting.start().await {
        Ok(boot) => {
            info!(
                "Showing total={} box={}",
                boot.snapshot.lifetime, boot.snapshot.in_box
            );
            if let Some(fault) = boot.fault {
                warn!("Lifetime count unavailable: {}", fault);
            }
        }
        Err(e) => fatal(e),
    }

    // Trigger lines idle low and pulse high
    let lines = [
        (Input::new(p.PIN_2, Pull::Down), Trigger::CountPart),
        (Input::new(p.PIN_3, Pull::Down), Trigger::ResetBox),
        (Input::new(p.PIN_6, Pull::Down), Trigger::ResetLifetime),
        (Input::new(p.PIN_7, Pull::Down), Trigger::PartIncoming),
    ];

    for (line, trigger) in lines {
        spawner
            .spawn(tasks::trigger_task(line, PENDING.latch(trigger)))
            .unwrap();
    }
    spawner.spawn(tasks::counting_task(counting)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Stop before the counting loop ever runs
fn fatal(error: StartupError) -> ! {
    defmt::panic!("Startup failed: {}", error)
}
