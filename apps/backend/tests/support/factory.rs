//! Rooms in a known state, built through the real services.

use draft_backend::db::require_db;
use draft_backend::db::txn::with_txn;
use draft_backend::domain::outcome::Outcome;
use draft_backend::repos::rooms::{self, Room};
use draft_backend::repos::season_games::{self, SeasonGame};
use draft_backend::services::draft::{DraftService, PickAccepted, PickUndone};
use draft_backend::services::rooms::{Coin, RoomService, Seated};
use draft_backend::AppState;
use time::OffsetDateTime;

/// Current time at whole-second precision, so values survive a database
/// round trip unchanged on every engine.
pub fn now() -> OffsetDateTime {
    let t = OffsetDateTime::now_utc();
    t.replace_nanosecond(0).unwrap_or(t)
}

/// Two seated participants; `alex` created the room and holds seat 1.
pub struct Pair {
    pub alex: Seated,
    pub sam: Seated,
}

impl Pair {
    pub fn room_id(&self) -> i64 {
        self.alex.room.id
    }

    pub fn code(&self) -> &str {
        &self.alex.room.code
    }
}

pub async fn create_room(state: &AppState, name: &str, now: OffsetDateTime) -> Seated {
    let service = RoomService::new(&state.settings);
    let name = name.to_string();
    with_txn(state, |txn| {
        Box::pin(async move { service.create_room(txn, &name, now).await })
    })
    .await
    .expect("create room")
}

pub async fn join_room(
    state: &AppState,
    room_id: i64,
    name: &str,
    now: OffsetDateTime,
) -> Outcome<Seated> {
    let service = RoomService::new(&state.settings);
    let name = name.to_string();
    with_txn(state, |txn| {
        Box::pin(async move { service.join_room(txn, room_id, &name, now).await })
    })
    .await
    .expect("join room")
}

pub async fn toss(state: &AppState, room_id: i64, coin: Coin, now: OffsetDateTime) -> Outcome<Room> {
    let service = RoomService::new(&state.settings);
    with_txn(state, |txn| {
        Box::pin(async move { service.assign_first_picker(txn, room_id, coin, now).await })
    })
    .await
    .expect("coin toss")
}

/// Room in `coin_toss` with Alex and Sam seated.
pub async fn seated_pair(state: &AppState, now: OffsetDateTime) -> Pair {
    let alex = create_room(state, "Alex", now).await;
    let sam = match join_room(state, alex.room.id, "Sam", now).await {
        Outcome::Accepted(seated) => seated,
        Outcome::Rejected(r) => panic!("join rejected: {r:?}"),
    };
    Pair { alex, sam }
}

/// Room in `drafting`; Heads makes Alex the first picker.
pub async fn drafting_pair(state: &AppState, coin: Coin, now: OffsetDateTime) -> Pair {
    let pair = seated_pair(state, now).await;
    match toss(state, pair.room_id(), coin, now).await {
        Outcome::Accepted(_) => pair,
        Outcome::Rejected(r) => panic!("coin toss rejected: {r:?}"),
    }
}

pub async fn pick(
    state: &AppState,
    room_id: i64,
    participant_id: i64,
    season_game_id: i64,
    now: OffsetDateTime,
) -> Outcome<PickAccepted> {
    let service = DraftService::new(&state.settings);
    with_txn(state, |txn| {
        Box::pin(async move {
            Ok(service
                .attempt_pick(txn, room_id, participant_id, season_game_id, now)
                .await?)
        })
    })
    .await
    .expect("pick")
}

pub async fn undo(
    state: &AppState,
    room_id: i64,
    participant_id: i64,
    pick_id: i64,
    now: OffsetDateTime,
) -> Outcome<PickUndone> {
    let service = DraftService::new(&state.settings);
    with_txn(state, |txn| {
        Box::pin(async move {
            Ok(service
                .undo(txn, room_id, participant_id, pick_id, now)
                .await?)
        })
    })
    .await
    .expect("undo")
}

/// The room's season games in schedule order.
pub async fn games(state: &AppState, room_id: i64) -> Vec<SeasonGame> {
    let db = require_db(state).expect("db");
    season_games::find_by_room(db, room_id).await.expect("games")
}

pub async fn reload(state: &AppState, room_id: i64) -> Room {
    let db = require_db(state).expect("db");
    rooms::require_by_id(db, room_id).await.expect("room")
}
