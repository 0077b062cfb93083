//! Indexing motion
//!
//! The fixed choreography that seats an incoming part and advances the feed.

pub mod indexer;

pub use indexer::{IndexPlan, Indexer, TRAVEL_DIVISOR};
