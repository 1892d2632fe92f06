//! Monitoring state
//!
//! The mutable record of which games are still being watched and when the
//! schedule was last refreshed. Owned by the monitor task; nothing else
//! writes to it.

use crate::config::SchedulerConfig;
use crate::scheduler::slots::Slot;
use crate::scheduler::window::check_window;
use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
pub struct MonitorState {
    slots: Vec<Slot>,
    last_refresh: Option<DateTime<Utc>>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True on first use or once the refresh cadence has elapsed
    pub fn needs_refresh(&self, now: DateTime<Utc>, config: &SchedulerConfig) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now - last > config.refresh_interval(),
        }
    }

    /// Replace the slot sequence wholesale after a schedule fetch
    pub fn replace_slots(&mut self, slots: Vec<Slot>, now: DateTime<Utc>) {
        self.slots = slots;
        self.last_refresh = Some(now);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// All game ids still being monitored, in slot order
    pub fn tracked_ids(&self) -> Vec<String> {
        self.slots
            .iter()
            .flat_map(|slot| slot.game_ids.iter().cloned())
            .collect()
    }

    /// Remove one game from monitoring.
    ///
    /// Locates the owning slot first, then applies the removal; a slot whose
    /// id set empties is dropped entirely. Returns false when the id is not
    /// tracked, which is normal after a prior retirement.
    pub fn retire(&mut self, game_id: &str) -> bool {
        let found = self
            .slots
            .iter()
            .position(|slot| slot.game_ids.iter().any(|id| id == game_id));

        let Some(slot_idx) = found else {
            return false;
        };

        let slot = &mut self.slots[slot_idx];
        slot.game_ids.retain(|id| id != game_id);
        if slot.game_ids.is_empty() {
            self.slots.remove(slot_idx);
        }
        true
    }

    /// Earliest upcoming check time, for observability.
    ///
    /// Returns `now` while inside a window, the next window's opening time
    /// when one is pending, or None when nothing is scheduled.
    pub fn next_check_time(
        &self,
        now: DateTime<Utc>,
        config: &SchedulerConfig,
    ) -> Option<DateTime<Utc>> {
        for slot in &self.slots {
            let window = check_window(slot, config);
            if window.contains(now) {
                return Some(now);
            }
            if now < window.opens {
                return Some(window.opens);
            }
        }
        None
    }
}
