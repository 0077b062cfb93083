//! Flash-backed byte cells for RP2040
//!
//! The RP2040 has no EEPROM, so byte cells are emulated with
//! sequential-storage's wear-leveled map in the last 64KB of flash.
//! Each cell is one map entry keyed by its `CellAddress`.
//!
//! Implements the `ByteStore` trait from `tally-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from tally-hal
pub use tally_hal::storage::{CellAddress, StoreError};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on Pico-class boards
pub const CELL_PARTITION_SIZE: usize = 64 * 1024; // 64KB for counter cells
pub const CELL_PARTITION_START: usize = FLASH_SIZE - CELL_PARTITION_SIZE;

/// Flash range for the cell partition
pub const CELL_RANGE: core::ops::Range<u32> =
    (CELL_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one map entry (key + one byte value + item header)
const ITEM_BUFFER_SIZE: usize = 32;

/// RP2040 flash cell store
///
/// Every write appends a new map entry, so wear is spread across the
/// partition; `write_if_changed` avoids appending when nothing changed.
pub struct Rp2040CellStore<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040CellStore<'d> {
    /// Create a new flash cell store
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    async fn fetch(&mut self, address: CellAddress) -> Result<Option<u8>, StoreError> {
        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];

        let result = map::fetch_item::<CellAddress, &[u8], _>(
            &mut self.flash,
            CELL_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &address,
        )
        .await;

        match result {
            Ok(Some(data)) => match data {
                [value] => Ok(Some(*value)),
                _ => Err(StoreError::Corrupted),
            },
            Ok(None) => Ok(None),
            Err(_) => Err(StoreError::Device),
        }
    }
}

// Implement the shared ByteStore trait
impl<'d> tally_hal::ByteStore for Rp2040CellStore<'d> {
    async fn read(&mut self, address: CellAddress) -> Result<u8, StoreError> {
        // Never-written cells read as zero
        Ok(self.fetch(address).await?.unwrap_or(0))
    }

    async fn write_if_changed(&mut self, address: CellAddress, value: u8) -> Result<bool, StoreError> {
        if self.fetch(address).await?.unwrap_or(0) == value {
            return Ok(false);
        }

        let mut data_buffer = [0u8; ITEM_BUFFER_SIZE];
        let data: &[u8] = &[value];

        map::store_item(
            &mut self.flash,
            CELL_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &address,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => StoreError::Full,
            sequential_storage::Error::Corrupted { .. } => StoreError::Corrupted,
            _ => StoreError::Device,
        })?;

        Ok(true)
    }
}
