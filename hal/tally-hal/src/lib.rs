//! Tally Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The counting logic only ever talks to these
//! traits, so the same core runs against RP2040 flash on the board and
//! against plain RAM on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (tally-core, firmware)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tally-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  tally-hal-   │       │  MemoryStore  │
//! │    rp2040     │       │  (RAM, host)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::ByteStore`] - Byte-addressable persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod storage;

// Re-export key types at crate root for convenience
pub use storage::{ByteStore, CellAddress, MemoryStore, StoreError};
