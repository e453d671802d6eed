//! Read-side services: snapshot, current turn and calendar export.
//!
//! Each takes a room id and re-reads the room on `conn`, so a caller that
//! passes one read transaction gets a header, version and ledger from the
//! same point in time.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::domain::calendar::{render_calendar, CalendarGame};
use crate::domain::lifecycle::is_expired;
use crate::domain::outcome::{DraftRejection, Outcome};
use crate::domain::snapshot::{assemble, ParticipantPublic, RoomHeader, RoomSnapshot};
use crate::domain::turn::{resolve_turn, Turn};
use crate::errors::domain::DomainError;
use crate::repos::{participants, picks, rooms, season_games};

/// Full room snapshot; expired rooms are rejected.
pub async fn load_snapshot<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    now: OffsetDateTime,
) -> Result<Outcome<RoomSnapshot>, DomainError> {
    let room = &rooms::require_by_id(conn, room_id).await?;
    if is_expired(room.expires_at, now) {
        return Ok(Outcome::Rejected(DraftRejection::RoomExpired));
    }
    let people = participants::find_by_room(conn, room.id).await?;
    let games = season_games::find_by_room(conn, room.id).await?;
    let ledger = picks::load_ledger(conn, room.id).await?;

    Ok(Outcome::Accepted(assemble(
        RoomHeader::from(room),
        people.iter().map(ParticipantPublic::from).collect(),
        games,
        &ledger,
        now,
    )))
}

/// The turn together with the room version it was resolved at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTurn {
    pub version: i32,
    pub turn: Turn,
}

/// Whose turn it is, from the ledger and first picker alone.
pub async fn current_turn<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<RoomTurn, DomainError> {
    let room = rooms::require_by_id(conn, room_id).await?;
    let people = participants::find_by_room(conn, room_id).await?;
    let ledger = picks::load_ledger(conn, room_id).await?;
    let ids: Vec<i64> = people.iter().map(|p| p.id).collect();
    Ok(RoomTurn {
        version: room.lock_version,
        turn: resolve_turn(ledger.valid_count(), &ids, room.first_picker_id),
    })
}

/// ICS document with the participant's valid picks in schedule order.
pub async fn calendar_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    participant_id: i64,
    now: OffsetDateTime,
) -> Result<String, DomainError> {
    let ledger = picks::load_ledger(conn, room_id).await?;
    let games = season_games::find_by_room(conn, room_id).await?;

    let events: Vec<CalendarGame> = games
        .into_iter()
        .filter(|g| {
            ledger
                .claimant_of(g.id)
                .is_some_and(|p| p.participant_id == participant_id)
        })
        .map(|g| CalendarGame {
            season_game_id: g.id,
            opponent: g.opponent,
            venue: g.venue,
            starts_at: PrimitiveDateTime::new(g.game_date, g.game_time),
        })
        .collect();

    Ok(render_calendar(&events, now))
}
