//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tally-core for the workstation hardware:
//!
//! - Stepper drivers (4-wire unipolar on GPIO coil lines)
//! - Count displays (SSD1306 128x32 OLED over I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod stepper;
