//! Count display implementations

pub mod ssd1306;

pub use ssd1306::{Frame, Ssd1306Display, DEFAULT_ADDRESS};
