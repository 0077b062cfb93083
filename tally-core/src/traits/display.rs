//! Presentation sink trait for the count display

/// Errors that can occur with display communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer to the panel failed
    Communication,
    /// Panel has not been initialized
    NotInitialized,
}

/// Counter values pushed to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Lifetime part count as persisted
    pub lifetime: u8,
    /// Parts in the current box
    pub in_box: u16,
}

impl Snapshot {
    /// Create a snapshot
    pub const fn new(lifetime: u8, in_box: u16) -> Self {
        Self { lifetime, in_box }
    }
}

/// Trait for the write-only count display
///
/// The display is a sink: it renders what it is given and reports only
/// whether the transfer worked. It never feeds anything back into the
/// counting logic.
pub trait CountDisplay {
    /// Show the one-off startup greeting
    fn greet(&mut self, greeting: &str) -> impl core::future::Future<Output = Result<(), DisplayError>>;

    /// Replace the screen with the given counter values
    fn show(&mut self, snapshot: Snapshot) -> impl core::future::Future<Output = Result<(), DisplayError>>;
}
