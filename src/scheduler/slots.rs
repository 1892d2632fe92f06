//! Slot grouping
//!
//! Games kicking off within the proximity threshold of each other are
//! monitored as one unit: their check windows are identical, so one poll
//! covers the whole group.

use crate::adapters::ScoreboardGame;
use chrono::{DateTime, Duration, Utc};

/// A group of games whose kickoffs cluster around one anchor time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Kickoff of the earliest game in the group
    pub anchor: DateTime<Utc>,
    /// Unresolved game ids, in schedule order
    pub game_ids: Vec<String>,
}

impl Slot {
    fn new(anchor: DateTime<Utc>, game_id: String) -> Self {
        Self {
            anchor,
            game_ids: vec![game_id],
        }
    }
}

/// Group games into kickoff slots.
///
/// Finished games are irrelevant to future monitoring and are filtered out.
/// The rest are sorted by kickoff; a game joins the current slot when its
/// kickoff is within `proximity` of the slot anchor, otherwise it opens a
/// new slot. Equal kickoffs always share a slot.
pub fn group_into_slots(games: &[ScoreboardGame], proximity: Duration) -> Vec<Slot> {
    let mut relevant: Vec<&ScoreboardGame> =
        games.iter().filter(|g| g.status.is_relevant()).collect();
    relevant.sort_by_key(|g| g.kickoff);

    let mut slots: Vec<Slot> = Vec::new();
    for game in relevant {
        match slots.last_mut() {
            Some(slot) if game.kickoff - slot.anchor <= proximity => {
                slot.game_ids.push(game.id.clone());
            }
            _ => slots.push(Slot::new(game.kickoff, game.id.clone())),
        }
    }
    slots
}
