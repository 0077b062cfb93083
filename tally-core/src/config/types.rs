//! Configuration type definitions
//!
//! Defaults reproduce the reference workstation: a 28BYJ-48-class motor
//! geared to 2070 steps per output revolution, turning at 7 RPM, and a
//! one-byte lifetime cell at address 0.

use heapless::String;
use tally_hal::CellAddress;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum greeting length (one display row)
pub const MAX_GREETING_LEN: usize = 21;

/// Default greeting shown once at boot
pub const DEFAULT_GREETING: &str = "Hello, Worker 1!";

/// What happens when the lifetime cell is at its maximum and another part arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverflowPolicy {
    /// Roll over to zero (255 + 1 = 0)
    #[default]
    Wrap,
    /// Stick at the maximum (255 + 1 = 255)
    Saturate,
}

impl OverflowPolicy {
    /// Apply the policy to `value + delta`
    pub fn add(self, value: u8, delta: u8) -> u8 {
        match self {
            OverflowPolicy::Wrap => value.wrapping_add(delta),
            OverflowPolicy::Saturate => value.saturating_add(delta),
        }
    }
}

/// Indexer motion configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexerConfig {
    /// Steps per output shaft revolution (both actuators)
    pub steps_per_rev: u16,
    /// Shaft speed in RPM (both actuators)
    pub rpm: u16,
    /// Pause between the backward and forward nudge, in ms
    pub settle_ms: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            steps_per_rev: 2070,
            rpm: 7,
            settle_ms: 1000,
        }
    }
}

/// Counter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CounterConfig {
    /// Store address of the lifetime cell
    pub address: u16,
    /// Dead time after each counted part, in ms
    pub debounce_ms: u32,
    /// Lifetime cell overflow behavior
    pub overflow: OverflowPolicy,
}

impl CounterConfig {
    /// Store address as a cell address
    pub fn cell(&self) -> CellAddress {
        CellAddress(self.address)
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            address: CellAddress::LIFETIME_COUNT.as_u16(),
            debounce_ms: 200,
            overflow: OverflowPolicy::Wrap,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// 7-bit I2C address of the panel
    pub i2c_address: u8,
    /// Greeting shown at boot
    pub greeting: String<MAX_GREETING_LEN>,
    /// How long the greeting stays up, in ms
    pub greeting_hold_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut greeting = String::new();
        let _ = greeting.push_str(DEFAULT_GREETING);
        Self {
            i2c_address: 0x3C,
            greeting,
            greeting_hold_ms: 1000,
        }
    }
}

/// Complete workstation configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkstationConfig {
    /// Indexer motion
    pub indexer: IndexerConfig,
    /// Lifetime and box counters
    pub counter: CounterConfig,
    /// Count display
    pub display: DisplayConfig,
}

impl WorkstationConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }
}
