//! Snake-draft turn resolution.
//!
//! Whose turn it is depends only on the number of valid picks and on who
//! picks first. Nothing about the turn is stored.

use serde::Serialize;

/// Picks in a complete draft, one per season game.
pub const TOTAL_TURNS: usize = 18;

/// Which side of the coin toss makes pick `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

/// Result of resolving the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "participantId", rename_all = "snake_case")]
pub enum Turn {
    /// This participant makes the next pick
    Picker(i64),
    /// All 18 picks are made
    Complete,
    /// Participants or first picker missing; every pick attempt is blocked
    Unresolvable,
}

impl Turn {
    pub fn picker(&self) -> Option<i64> {
        match self {
            Turn::Picker(id) => Some(*id),
            Turn::Complete | Turn::Unresolvable => None,
        }
    }
}

/// Slot for the pick made when `n` valid picks already exist.
///
/// Pairs alternate direction: A,B then B,A then A,B ...
pub fn slot_for(n: usize) -> Slot {
    let round = n / 2;
    if (round % 2 == 0) == (n % 2 == 0) {
        Slot::First
    } else {
        Slot::Second
    }
}

/// Resolve the next picker.
///
/// `participants` are the room's participant ids in seat order. The first
/// picker must be one of them; the other participant picks second.
pub fn resolve_turn(valid_pick_count: usize, participants: &[i64], first_picker: Option<i64>) -> Turn {
    if participants.len() < 2 {
        return Turn::Unresolvable;
    }
    let Some(first) = first_picker else {
        return Turn::Unresolvable;
    };
    if valid_pick_count >= TOTAL_TURNS {
        return Turn::Complete;
    }
    if !participants.contains(&first) {
        return Turn::Unresolvable;
    }
    let Some(second) = participants.iter().copied().find(|id| *id != first) else {
        return Turn::Unresolvable;
    };

    match slot_for(valid_pick_count) {
        Slot::First => Turn::Picker(first),
        Slot::Second => Turn::Picker(second),
    }
}
