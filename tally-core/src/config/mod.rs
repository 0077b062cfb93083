//! Configuration types
//!
//! Workstation configuration and the TOML subset it is written in.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
