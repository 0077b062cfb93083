//! Persistent byte storage abstractions
//!
//! Provides a trait for a small byte-addressable store (EEPROM-style
//! cells) that chip-specific HALs implement on top of whatever
//! non-volatile memory they have.

/// Address of a single byte cell in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CellAddress(pub u16);

impl CellAddress {
    /// Cell holding the lifetime part count
    pub const LIFETIME_COUNT: Self = Self(0);

    /// Get the address as a raw value
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Get the address as a slice index
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors from byte store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying memory operation failed
    Device,
    /// Address is outside the store
    OutOfRange,
    /// Stored record is corrupted or has the wrong shape
    Corrupted,
    /// No room left for the write
    Full,
}

/// Byte-addressable persistent store
///
/// Models an EEPROM-like medium: every address holds one byte, reads are
/// cheap, writes wear the medium. Implementations must skip the physical
/// write when the stored value already equals the new one.
///
/// A cell that has never been written reads as `0`.
pub trait ByteStore {
    /// Read the byte stored at `address`
    fn read(
        &mut self,
        address: CellAddress,
    ) -> impl core::future::Future<Output = Result<u8, StoreError>>;

    /// Write `value` at `address` unless it is already stored there
    ///
    /// # Returns
    /// `true` if the medium was written, `false` if the write was skipped.
    fn write_if_changed(
        &mut self,
        address: CellAddress,
        value: u8,
    ) -> impl core::future::Future<Output = Result<bool, StoreError>>;
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    async fn read(&mut self, address: CellAddress) -> Result<u8, StoreError> {
        T::read(self, address).await
    }

    async fn write_if_changed(&mut self, address: CellAddress, value: u8) -> Result<bool, StoreError> {
        T::write_if_changed(self, address, value).await
    }
}

/// RAM-backed byte store
///
/// Volatile, so it does not survive a power cycle. Used on boards without
/// persistent memory and as the reference store in host tests.
#[derive(Debug, Clone)]
pub struct MemoryStore<const N: usize> {
    cells: [u8; N],
    writes: u32,
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryStore<N> {
    /// Create a store with every cell at zero
    pub const fn new() -> Self {
        Self {
            cells: [0; N],
            writes: 0,
        }
    }

    /// Create a store with the given initial contents
    pub const fn with_cells(cells: [u8; N]) -> Self {
        Self { cells, writes: 0 }
    }

    /// Number of physical writes performed so far
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Peek at a cell without going through the async interface
    pub fn cell(&self, address: CellAddress) -> Option<u8> {
        self.cells.get(address.index()).copied()
    }
}

impl<const N: usize> ByteStore for MemoryStore<N> {
    async fn read(&mut self, address: CellAddress) -> Result<u8, StoreError> {
        self.cell(address).ok_or(StoreError::OutOfRange)
    }

    async fn write_if_changed(&mut self, address: CellAddress, value: u8) -> Result<bool, StoreError> {
        let cell = self
            .cells
            .get_mut(address.index())
            .ok_or(StoreError::OutOfRange)?;

        if *cell == value {
            return Ok(false);
        }

        *cell = value;
        self.writes = self.writes.saturating_add(1);
        Ok(true)
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for CellAddress {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.len() < 2 {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[..2].copy_from_slice(&self.0.to_le_bytes());
        Ok(2)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.len() < 2 {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        Ok((CellAddress(u16::from_le_bytes([buffer[0], buffer[1]])), 2))
    }
}
