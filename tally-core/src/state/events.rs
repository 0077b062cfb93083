//! Trigger lines that raise counting events

/// Number of trigger lines
pub const TRIGGER_COUNT: usize = 4;

/// Physical trigger lines, one per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Counting sensor saw a part drop into the box
    CountPart,
    /// Operator started a new box
    ResetBox,
    /// Operator cleared the lifetime tally
    ResetLifetime,
    /// A part is waiting at the feed; run the indexer
    PartIncoming,
}

impl Trigger {
    /// Dispatch order when several triggers are pending in the same tick
    ///
    /// Counting and resets come before motion, so a count is never held
    /// back by an indexer run.
    pub const PRIORITY: [Trigger; TRIGGER_COUNT] = [
        Trigger::CountPart,
        Trigger::ResetBox,
        Trigger::ResetLifetime,
        Trigger::PartIncoming,
    ];

    /// Slot of this trigger in per-trigger tables
    pub const fn index(self) -> usize {
        match self {
            Trigger::CountPart => 0,
            Trigger::ResetBox => 1,
            Trigger::ResetLifetime => 2,
            Trigger::PartIncoming => 3,
        }
    }

    /// Check if handling this trigger changes a counter
    pub fn is_counter_event(&self) -> bool {
        matches!(
            self,
            Trigger::CountPart | Trigger::ResetBox | Trigger::ResetLifetime
        )
    }

    /// Check if handling this trigger moves the actuators
    pub fn is_motion_event(&self) -> bool {
        matches!(self, Trigger::PartIncoming)
    }
}
