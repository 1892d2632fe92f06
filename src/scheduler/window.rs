//! Check window derivation
//!
//! A typical NFL game runs about 3 to 3.5 hours, so polling is only worth
//! doing between 3 and 4 hours after kickoff. Windows are derived from the
//! slot anchor on every use and never cached.

use crate::config::SchedulerConfig;
use crate::scheduler::slots::Slot;
use chrono::{DateTime, Utc};

/// Half-open interval during which a slot's games are likely finishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckWindow {
    pub opens: DateTime<Utc>,
    pub closes: DateTime<Utc>,
    pub game_ids: Vec<String>,
}

impl CheckWindow {
    /// `[opens, closes)` containment
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.opens <= t && t < self.closes
    }
}

/// Derive the check window for one slot
pub fn check_window(slot: &Slot, config: &SchedulerConfig) -> CheckWindow {
    CheckWindow {
        opens: slot.anchor + config.window_open_offset(),
        closes: slot.anchor + config.window_close_offset(),
        game_ids: slot.game_ids.clone(),
    }
}
