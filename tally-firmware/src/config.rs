//! Workstation configuration loading
//!
//! The configuration is compiled into the image from `workstation.toml`
//! and parsed at boot with the `no_std` parser from tally-core. The
//! build script has already checked the same file on the host.

use defmt::*;

use tally_core::config::{parse_config, WorkstationConfig};

/// Embedded configuration; edit workstation.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../workstation.toml");

/// Parse the embedded configuration
///
/// Falls back to the built-in defaults if parsing fails, which can only
/// happen if the on-target parser and the build-time check disagree.
pub fn load() -> WorkstationConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using built-in defaults");
            WorkstationConfig::default()
        }
    }
}
