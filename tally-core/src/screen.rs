//! Text layout of the count screen
//!
//! Kept apart from any panel driver so the wording can be tested on the
//! host and shared by every display implementation.

use core::fmt::Write;

use heapless::String;

use crate::traits::Snapshot;

/// Characters per row on a 128 px wide panel with a 6 px font
pub const ROW_CHARS: usize = 21;

/// Rows of the count screen
pub const ROWS: usize = 2;

/// One line of screen text
pub type Line = String<ROW_CHARS>;

/// Count screen layout
pub struct CountScreen;

impl CountScreen {
    /// Render the two rows for `snapshot`
    pub fn lines(snapshot: Snapshot) -> [Line; ROWS] {
        [
            Self::row("Total Parts: ", u32::from(snapshot.lifetime)),
            Self::row("Parts in Box: ", u32::from(snapshot.in_box)),
        ]
    }

    fn row(label: &str, value: u32) -> Line {
        let mut line = Line::new();
        // Longest row is "Parts in Box: 65535", well inside ROW_CHARS
        let _ = write!(line, "{}{}", label, value);
        line
    }
}
