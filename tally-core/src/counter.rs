//! Lifetime part counter backed by a persistent byte cell
//!
//! The count lives in a single one-byte cell, so its range is 0-255.
//! What happens past 255 is an explicit [`OverflowPolicy`] rather than an
//! accident of the integer width. Updates are plain read-modify-write; a
//! power loss between the read and the write loses that one increment.

use tally_hal::{ByteStore, CellAddress, StoreError};

use crate::config::{CounterConfig, OverflowPolicy};

/// Largest value the lifetime cell can hold
pub const LIFETIME_MAX: u8 = u8::MAX;

/// Durable lifetime counter
pub struct LifetimeCounter<S> {
    store: S,
    address: CellAddress,
    policy: OverflowPolicy,
}

impl<S: ByteStore> LifetimeCounter<S> {
    /// Create a counter over `store` at `address`
    pub fn new(store: S, address: CellAddress, policy: OverflowPolicy) -> Self {
        Self {
            store,
            address,
            policy,
        }
    }

    /// Create a counter from configuration
    pub fn from_config(store: S, config: &CounterConfig) -> Self {
        Self::new(store, config.cell(), config.overflow)
    }

    /// Read the persisted count
    pub async fn read(&mut self) -> Result<u8, StoreError> {
        self.store.read(self.address).await
    }

    /// Add `delta` to the persisted count
    ///
    /// Returns the new value as written.
    pub async fn increment_by(&mut self, delta: u8) -> Result<u8, StoreError> {
        let current = self.store.read(self.address).await?;
        let next = self.policy.add(current, delta);
        self.store.write_if_changed(self.address, next).await?;
        Ok(next)
    }

    /// Set the persisted count to zero
    ///
    /// Unconditional from the caller's side; the store itself skips the
    /// physical write if the cell is already zero.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.store.write_if_changed(self.address, 0).await?;
        Ok(())
    }

    /// Cell this counter lives in
    pub fn address(&self) -> CellAddress {
        self.address
    }

    /// Overflow policy in effect
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
