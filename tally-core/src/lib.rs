//! Board-agnostic core logic for the parts counting workstation
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Trigger lines and their lock-free pending flags
//! - Durable lifetime counter over a persistent byte store
//! - Two-actuator indexing sequence
//! - Counting core that dispatches pending events once per tick
//! - Count screen text layout
//! - Configuration types and parser
//!
//! ```text
//! edge handler ──fire()──► PendingEvents ◄──poll()── CountingCore
//!                                                      │
//!                          ┌───────────────┬───────────┴─────┐
//!                          ▼               ▼                 ▼
//!                   LifetimeCounter     Indexer        CountDisplay
//!                     (ByteStore)   (2x CoilStepper)
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod counter;
pub mod motion;
pub mod scheduler;
pub mod screen;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use counter::LifetimeCounter;
pub use motion::{IndexPlan, Indexer};
pub use scheduler::{Boot, CoreSettings, CountingCore, Fault, StartupError, Tick};
pub use screen::CountScreen;
pub use state::{EdgeLatch, PendingEvents, Trigger};
