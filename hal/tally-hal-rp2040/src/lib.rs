//! RP2040-specific HAL for the parts counting firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `tally-hal` traits:
//!
//! - Flash-backed byte cells (implements `tally_hal::ByteStore`)

#![no_std]

pub mod flash;

// Re-export shared traits from tally-hal for convenience
pub use tally_hal::{ByteStore, CellAddress, StoreError};
