//! Read model of a room sent to clients.
//!
//! Claims, turn and undo offer are derived from the ledger at read time.

use serde::Serialize;
use time::{Date, OffsetDateTime, Time};

use super::ledger::{LedgerPick, PickLedger};
use super::lifecycle::RoomStatus;
use super::turn::{resolve_turn, Turn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomHeader {
    pub id: i64,
    pub code: String,
    pub status: RoomStatus,
    pub first_picker_id: Option<i64>,
    pub total_turns: i16,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// `lock_version`; bumps on every mutation
    pub version: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPublic {
    pub id: i64,
    pub display_name: String,
    pub seat: i16,
}

/// Season game as stored, before claim info is attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRow {
    pub id: i64,
    pub opponent: String,
    pub venue: String,
    pub game_date: Date,
    pub game_time: Time,
    pub is_marquee: bool,
    pub is_family: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePublic {
    pub id: i64,
    pub opponent: String,
    pub venue: String,
    pub game_date: String,
    pub game_time: String,
    pub is_marquee: bool,
    pub is_family: bool,
    pub claimed_by: Option<i64>,
    pub pick_number: Option<i16>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickPublic {
    pub id: i64,
    pub season_game_id: i64,
    pub participant_id: i64,
    pub pick_number: i16,
    #[serde(with = "time::serde::rfc3339")]
    pub picked_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub undo_deadline: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub undone_at: Option<OffsetDateTime>,
}

impl From<&LedgerPick> for PickPublic {
    fn from(p: &LedgerPick) -> Self {
        Self {
            id: p.id,
            season_game_id: p.season_game_id,
            participant_id: p.participant_id,
            pick_number: p.pick_number,
            picked_at: p.picked_at,
            undo_deadline: p.undo_deadline,
            undone_at: p.undone_at,
        }
    }
}

/// Latest pick its owner may still retract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoOffer {
    pub pick_id: i64,
    pub participant_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room: RoomHeader,
    pub participants: Vec<ParticipantPublic>,
    pub games: Vec<GamePublic>,
    pub picks: Vec<PickPublic>,
    pub turn: Turn,
    pub valid_pick_count: usize,
    pub undo: Option<UndoOffer>,
}

fn undo_offer(status: RoomStatus, ledger: &PickLedger, now: OffsetDateTime) -> Option<UndoOffer> {
    if status != RoomStatus::Drafting {
        return None;
    }
    ledger
        .latest_valid()
        .filter(|p| now < p.undo_deadline)
        .map(|p| UndoOffer {
            pick_id: p.id,
            participant_id: p.participant_id,
            deadline: p.undo_deadline,
        })
}

/// Assemble the snapshot from rows read in one transaction.
pub fn assemble(
    room: RoomHeader,
    mut participants: Vec<ParticipantPublic>,
    mut games: Vec<GameRow>,
    ledger: &PickLedger,
    now: OffsetDateTime,
) -> RoomSnapshot {
    participants.sort_by_key(|p| p.seat);
    games.sort_by_key(|g| (g.game_date, g.game_time, g.id));

    let ids: Vec<i64> = participants.iter().map(|p| p.id).collect();
    let valid_pick_count = ledger.valid_count();
    let turn = resolve_turn(valid_pick_count, &ids, room.first_picker_id);
    let undo = undo_offer(room.status, ledger, now);

    let games = games
        .into_iter()
        .map(|g| {
            let claim = ledger.claimant_of(g.id);
            GamePublic {
                id: g.id,
                opponent: g.opponent,
                venue: g.venue,
                game_date: g.game_date.to_string(),
                game_time: format!("{:02}:{:02}", g.game_time.hour(), g.game_time.minute()),
                is_marquee: g.is_marquee,
                is_family: g.is_family,
                claimed_by: claim.map(|p| p.participant_id),
                pick_number: claim.map(|p| p.pick_number),
            }
        })
        .collect();

    RoomSnapshot {
        room,
        participants,
        games,
        picks: ledger.all().iter().map(PickPublic::from).collect(),
        turn,
        valid_pick_count,
        undo,
    }
}
