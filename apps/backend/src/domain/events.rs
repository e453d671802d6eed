//! Change notifications published after a draft write commits.
//!
//! Each committed write publishes exactly one event carrying the room
//! version it produced. A write that also moves the room status reports
//! the new status on that same event.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEvent {
    pub room_id: i64,
    /// Room version after the write
    pub version: i32,
    #[serde(flatten)]
    pub kind: DraftEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DraftEventKind {
    PickAdded {
        pick_id: i64,
        participant_id: i64,
        season_game_id: i64,
        pick_number: i16,
        next_picker_id: Option<i64>,
        /// Room status after the pick; `complete` on the last one
        status: String,
    },
    PickUndone {
        pick_id: i64,
        participant_id: i64,
        season_game_id: i64,
        next_picker_id: Option<i64>,
    },
    StatusChanged {
        status: String,
        first_picker_id: Option<i64>,
    },
    ParticipantJoined {
        participant_id: i64,
        display_name: String,
        /// Room status after the join; `coin_toss` once both seats are taken
        status: String,
    },
}

impl DraftEvent {
    pub fn new(room_id: i64, version: i32, kind: DraftEventKind) -> Self {
        Self {
            room_id,
            version,
            kind,
        }
    }

    /// Participant who caused the event, if any.
    pub fn actor(&self) -> Option<i64> {
        match &self.kind {
            DraftEventKind::PickAdded { participant_id, .. }
            | DraftEventKind::PickUndone { participant_id, .. }
            | DraftEventKind::ParticipantJoined { participant_id, .. } => Some(*participant_id),
            DraftEventKind::StatusChanged { .. } => None,
        }
    }

    /// Room status after the event, when the event carries one.
    pub fn status(&self) -> Option<&str> {
        match &self.kind {
            DraftEventKind::PickAdded { status, .. }
            | DraftEventKind::StatusChanged { status, .. }
            | DraftEventKind::ParticipantJoined { status, .. } => Some(status),
            DraftEventKind::PickUndone { .. } => None,
        }
    }

    /// Participant whose turn it is after the event, when the event says so.
    pub fn next_picker(&self) -> Option<i64> {
        match &self.kind {
            DraftEventKind::PickAdded { next_picker_id, .. }
            | DraftEventKind::PickUndone { next_picker_id, .. } => *next_picker_id,
            DraftEventKind::StatusChanged { first_picker_id, .. } => *first_picker_id,
            DraftEventKind::ParticipantJoined { .. } => None,
        }
    }
}
