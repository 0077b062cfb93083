//! Event state shared with the edge handlers
//!
//! Four trigger lines, one pending flag each. The flags are the only
//! state the asynchronous edge handlers touch.

pub mod events;
pub mod pending;

pub use events::{Trigger, TRIGGER_COUNT};
pub use pending::{EdgeLatch, PendingEvents};
