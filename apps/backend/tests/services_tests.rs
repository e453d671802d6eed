mod common;
mod support;

use draft_backend::db::require_db;
use draft_backend::db::txn::with_txn;
use draft_backend::domain::lifecycle::RoomStatus;
use draft_backend::domain::outcome::{DraftRejection, Outcome};
use draft_backend::domain::turn::{slot_for, Slot, Turn, TOTAL_TURNS};
use draft_backend::errors::domain::{DomainError, NotFoundKind};
use draft_backend::adapters::participants_sea::ParticipantCreate;
use draft_backend::adapters::picks_sea::PickCreate;
use draft_backend::repos::{participants, picks, rooms};
use draft_backend::services::draft::DraftService;
use draft_backend::services::rooms::{Coin, PlannedJoin, RoomService};
use draft_backend::services::snapshot::{calendar_for, current_turn, load_snapshot};
use draft_backend::{AppError, DraftSettings, ErrorCode};
use support::factory::{self, Pair};
use support::test_state::{build_test_state, build_test_state_with};
use time::Duration;

fn accepted<T>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Accepted(v) => v,
        Outcome::Rejected(r) => panic!("expected Accepted, got {r:?}"),
    }
}

fn rejection<T>(outcome: Outcome<T>) -> DraftRejection {
    outcome.rejection().expect("expected Rejected")
}

/// Participant id for pick `n` when `pair.alex` won the toss.
fn picker_for(pair: &Pair, n: usize) -> i64 {
    match slot_for(n) {
        Slot::First => pair.alex.participant.id,
        Slot::Second => pair.sam.participant.id,
    }
}

#[actix_web::test]
async fn opening_picks_follow_the_snake() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a, b) = (pair.room_id(), pair.alex.participant.id, pair.sam.participant.id);
    let games = factory::games(&state, room).await;
    let (x, y, w, z) = (games[0].id, games[1].id, games[2].id, games[3].id);

    let first = accepted(factory::pick(&state, room, a, x, now).await);
    assert_eq!(first.pick.pick_number, 0);
    assert_eq!(first.next_turn, Turn::Picker(b));

    assert_eq!(
        rejection(factory::pick(&state, room, b, x, now).await),
        DraftRejection::ItemAlreadyClaimed
    );

    let second = accepted(factory::pick(&state, room, b, y, now).await);
    assert_eq!(second.pick.pick_number, 1);
    // index 2 stays with B
    assert_eq!(second.next_turn, Turn::Picker(b));
    assert_eq!(
        rejection(factory::pick(&state, room, a, z, now).await),
        DraftRejection::TurnViolation
    );

    let third = accepted(factory::pick(&state, room, b, w, now).await);
    assert_eq!(third.pick.pick_number, 2);
    let fourth = accepted(factory::pick(&state, room, a, z, now).await);
    assert_eq!(fourth.pick.pick_number, 3);
    assert_eq!(fourth.next_turn, Turn::Picker(a));
}

// Interleaves only on a multi-connection pool; the single-connection
// SQLite pools run the two transactions back to back.
#[actix_web::test]
async fn simultaneous_identical_picks_accept_exactly_one() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let room = pair.room_id();
    let a = pair.alex.participant.id;
    let x = factory::games(&state, room).await[0].id;

    let (left, right) = tokio::join!(
        factory::pick(&state, room, a, x, now),
        factory::pick(&state, room, a, x, now)
    );

    let outcomes = [left, right];
    assert_eq!(outcomes.iter().filter(|o| o.is_accepted()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|o| o.rejection() == Some(DraftRejection::ItemAlreadyClaimed)));

    let db = require_db(&state).unwrap();
    let ledger = picks::load_ledger(db, room).await.unwrap();
    assert_eq!(ledger.valid_count(), 1);
    ledger.verify().unwrap();
}

#[actix_web::test]
async fn eighteenth_pick_completes_and_nineteenth_is_refused() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let room = pair.room_id();
    let games = factory::games(&state, room).await;
    assert_eq!(games.len(), TOTAL_TURNS);

    for (n, game) in games.iter().enumerate() {
        let outcome = factory::pick(&state, room, picker_for(&pair, n), game.id, now).await;
        let done = accepted(outcome);
        assert_eq!(done.pick.pick_number as usize, n);
        let expected = if n + 1 == TOTAL_TURNS {
            RoomStatus::Complete
        } else {
            RoomStatus::Drafting
        };
        assert_eq!(done.room.status, expected, "after pick {n}");
    }

    assert_eq!(
        rejection(factory::pick(&state, room, pair.alex.participant.id, games[0].id, now).await),
        DraftRejection::DraftAlreadyComplete
    );

    let db = require_db(&state).unwrap();
    let ledger = picks::load_ledger(db, room).await.unwrap();
    ledger.verify().unwrap();
    assert_eq!(ledger.valid_by(pair.alex.participant.id).count(), 9);
    assert_eq!(ledger.valid_by(pair.sam.participant.id).count(), 9);

    let last = ledger.latest_valid().unwrap().id;
    assert_eq!(
        rejection(factory::undo(&state, room, picker_for(&pair, 17), last, now).await),
        DraftRejection::RoomNotDrafting
    );
}

#[actix_web::test]
async fn undo_inside_window_frees_the_item_and_the_turn() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;

    let picked = accepted(factory::pick(&state, room, a, x, now).await);
    let version_after_pick = picked.room.lock_version;

    let undone = accepted(factory::undo(&state, room, a, picked.pick.id, now + Duration::seconds(10)).await);
    assert!(undone.pick.undone_at.is_some());
    assert_eq!(undone.next_turn, Turn::Picker(a));
    assert!(undone.room.lock_version > version_after_pick);

    let again = accepted(factory::pick(&state, room, a, x, now + Duration::seconds(11)).await);
    assert_eq!(again.pick.pick_number, 0);

    let db = require_db(&state).unwrap();
    let ledger = picks::load_ledger(db, room).await.unwrap();
    assert_eq!(ledger.all().len(), 2);
    assert_eq!(ledger.valid_count(), 1);
    ledger.verify().unwrap();
}

#[actix_web::test]
async fn undo_at_the_deadline_is_too_late() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;

    let picked = accepted(factory::pick(&state, room, a, x, now).await);
    let deadline = picked.pick.undo_deadline;
    assert_eq!(deadline, now + state.settings.undo_window);

    assert_eq!(
        rejection(factory::undo(&state, room, a, picked.pick.id, deadline).await),
        DraftRejection::WindowExpired
    );
}

#[actix_web::test]
async fn configured_undo_window_sets_the_deadline() {
    let settings = DraftSettings::default().with_undo_window(Duration::seconds(5));
    let state = build_test_state_with(settings).await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;

    let picked = accepted(factory::pick(&state, room, a, x, now).await);
    assert_eq!(picked.pick.undo_deadline, now + Duration::seconds(5));
    assert_eq!(
        rejection(factory::undo(&state, room, a, picked.pick.id, now + Duration::seconds(6)).await),
        DraftRejection::WindowExpired
    );

    let snapshot = accepted(
        load_snapshot(require_db(&state).unwrap(), room, now + Duration::seconds(4))
            .await
            .unwrap(),
    );
    assert_eq!(snapshot.undo.map(|u| u.pick_id), Some(picked.pick.id));
}

#[actix_web::test]
async fn undo_is_owner_and_latest_only() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a, b) = (pair.room_id(), pair.alex.participant.id, pair.sam.participant.id);
    let games = factory::games(&state, room).await;

    let first = accepted(factory::pick(&state, room, a, games[0].id, now).await);
    assert_eq!(
        rejection(factory::undo(&state, room, b, first.pick.id, now).await),
        DraftRejection::NotOwner
    );

    accepted(factory::pick(&state, room, b, games[1].id, now).await);
    assert_eq!(
        rejection(factory::undo(&state, room, a, first.pick.id, now).await),
        DraftRejection::NotLatestPick
    );

    let service = DraftService::new(&state.settings);
    let err = with_txn(&state, |txn| {
        Box::pin(async move { Ok(service.undo(txn, room, a, 999_999, now).await) })
    })
    .await
    .unwrap()
    .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Pick, _)));
}

#[actix_web::test]
async fn undo_then_pick_keeps_alternation() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a, b) = (pair.room_id(), pair.alex.participant.id, pair.sam.participant.id);
    let games = factory::games(&state, room).await;

    accepted(factory::pick(&state, room, a, games[0].id, now).await);
    let sams = accepted(factory::pick(&state, room, b, games[1].id, now).await);
    let undone = accepted(factory::undo(&state, room, b, sams.pick.id, now).await);
    assert_eq!(undone.next_turn, Turn::Picker(b));
    assert_eq!(
        rejection(factory::pick(&state, room, a, games[2].id, now).await),
        DraftRejection::TurnViolation
    );

    let redo = accepted(factory::pick(&state, room, b, games[2].id, now).await);
    assert_eq!(redo.pick.pick_number, 1);
    let next = accepted(factory::pick(&state, room, b, games[1].id, now).await);
    assert_eq!(next.pick.pick_number, 2);
    assert_eq!(next.next_turn, Turn::Picker(a));

    let db = require_db(&state).unwrap();
    let ledger = picks::load_ledger(db, room).await.unwrap();
    ledger.verify().unwrap();
    let numbers: Vec<i16> = ledger.valid().map(|p| p.pick_number).collect();
    assert_eq!(numbers, vec![0, 1, 2]);
}

#[actix_web::test]
async fn picks_wait_for_the_coin_toss() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::seated_pair(&state, now).await;
    let room = pair.room_id();
    let x = factory::games(&state, room).await[0].id;

    assert_eq!(
        rejection(factory::pick(&state, room, pair.alex.participant.id, x, now).await),
        DraftRejection::RoomNotDrafting
    );

    let db = require_db(&state).unwrap();
    let turn = current_turn(db, room).await.unwrap();
    assert_eq!(turn.turn, Turn::Unresolvable);
    assert_eq!(turn.version, factory::reload(&state, room).await.lock_version);
}

#[actix_web::test]
async fn unknown_game_is_not_found() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);

    // a game seeded for another room does not belong here
    let other = factory::create_room(&state, "Kim", now).await;
    let foreign = factory::games(&state, other.room.id).await[0].id;

    let service = DraftService::new(&state.settings);
    let err = with_txn(&state, |txn| {
        Box::pin(async move { Ok(service.attempt_pick(txn, room, a, foreign, now).await) })
    })
    .await
    .unwrap()
    .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::SeasonGame, _)));
}

#[actix_web::test]
async fn simultaneous_joins_seat_one_joiner() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let host = factory::create_room(&state, "Alex", now).await;
    let room = host.room.id;

    let (sam, kim) = tokio::join!(
        factory::join_room(&state, room, "Sam", now),
        factory::join_room(&state, room, "Kim", now)
    );
    let outcomes = [sam, kim];
    assert_eq!(outcomes.iter().filter(|o| o.is_accepted()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|o| o.rejection() == Some(DraftRejection::RoomFull)));

    let db = require_db(&state).unwrap();
    assert_eq!(participants::count_by_room(db, room).await.unwrap(), 2);
    assert_eq!(factory::reload(&state, room).await.status, RoomStatus::CoinToss);

    assert_eq!(
        rejection(factory::join_room(&state, room, "Lee", now).await),
        DraftRejection::RoomFull
    );
}

#[actix_web::test]
async fn coin_toss_happens_once() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::seated_pair(&state, now).await;
    let room = pair.room_id();

    let tossed = accepted(factory::toss(&state, room, Coin::Tails, now).await);
    assert_eq!(tossed.status, RoomStatus::Drafting);
    assert_eq!(tossed.first_picker_id, Some(pair.sam.participant.id));

    assert_eq!(
        rejection(factory::toss(&state, room, Coin::Heads, now).await),
        DraftRejection::RoomNotInCoinToss
    );
    let after = factory::reload(&state, room).await;
    assert_eq!(after.first_picker_id, Some(pair.sam.participant.id));
    assert_eq!(after.lock_version, tossed.lock_version);

    let db = require_db(&state).unwrap();
    assert_eq!(
        current_turn(db, room).await.unwrap().turn,
        Turn::Picker(pair.sam.participant.id)
    );
}

#[actix_web::test]
async fn coin_toss_needs_a_full_room() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let host = factory::create_room(&state, "Alex", now).await;

    assert_eq!(
        rejection(factory::toss(&state, host.room.id, Coin::Heads, now).await),
        DraftRejection::RoomNotInCoinToss
    );
}

#[actix_web::test]
async fn expired_rooms_refuse_every_operation() {
    let settings = DraftSettings::default().with_room_ttl(Duration::minutes(5));
    let state = build_test_state_with(settings).await.unwrap();
    let now = factory::now();
    let later = now + Duration::minutes(5);

    let drafting = factory::drafting_pair(&state, Coin::Heads, now).await;
    let room = drafting.room_id();
    let a = drafting.alex.participant.id;
    let games = factory::games(&state, room).await;
    let picked = accepted(factory::pick(&state, room, a, games[0].id, now).await);

    assert_eq!(
        rejection(factory::pick(&state, room, drafting.sam.participant.id, games[1].id, later).await),
        DraftRejection::RoomExpired
    );
    assert_eq!(
        rejection(factory::undo(&state, room, a, picked.pick.id, later).await),
        DraftRejection::RoomExpired
    );

    let waiting = factory::create_room(&state, "Kim", now).await;
    assert_eq!(
        rejection(factory::join_room(&state, waiting.room.id, "Lee", later).await),
        DraftRejection::RoomExpired
    );

    let tossing = factory::seated_pair(&state, now).await;
    assert_eq!(
        rejection(factory::toss(&state, tossing.room_id(), Coin::Heads, later).await),
        DraftRejection::RoomExpired
    );

    let db = require_db(&state).unwrap();
    assert_eq!(
        load_snapshot(db, room, later).await.unwrap().rejection(),
        Some(DraftRejection::RoomExpired)
    );
}

#[actix_web::test]
async fn create_room_seeds_the_season_and_validates_names() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();

    let host = factory::create_room(&state, "  Alex  ", now).await;
    assert_eq!(host.participant.display_name, "Alex");
    assert_eq!(host.participant.seat, 1);
    assert_eq!(host.room.status, RoomStatus::Waiting);
    assert_eq!(host.room.code.len(), 6);
    assert_eq!(host.room.expires_at, now + state.settings.room_ttl);
    assert_eq!(factory::games(&state, host.room.id).await.len(), TOTAL_TURNS);

    let service = RoomService::new(&state.settings);
    let err = with_txn(&state, |txn| {
        Box::pin(async move { service.create_room(txn, "   ", now).await })
    })
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation { code: ErrorCode::InvalidName, .. }));
}

#[actix_web::test]
async fn snapshot_offers_undo_to_the_latest_picker() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;
    let picked = accepted(factory::pick(&state, room, a, x, now).await);

    let db = require_db(&state).unwrap();
    let snapshot = accepted(load_snapshot(db, room, now).await.unwrap());

    assert_eq!(snapshot.valid_pick_count, 1);
    assert_eq!(snapshot.participants.len(), 2);
    assert_eq!(snapshot.turn, Turn::Picker(pair.sam.participant.id));
    let offer = snapshot.undo.expect("undo offer");
    assert_eq!(offer.pick_id, picked.pick.id);
    assert_eq!(offer.participant_id, a);
    let claimed = snapshot.games.iter().find(|g| g.id == x).unwrap();
    assert_eq!(claimed.claimed_by, Some(a));

    let stale = accepted(load_snapshot(db, room, picked.pick.undo_deadline).await.unwrap());
    assert!(stale.undo.is_none());
}

#[actix_web::test]
async fn calendar_lists_only_the_callers_picks() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a, b) = (pair.room_id(), pair.alex.participant.id, pair.sam.participant.id);
    let games = factory::games(&state, room).await;

    accepted(factory::pick(&state, room, a, games[0].id, now).await);
    accepted(factory::pick(&state, room, b, games[1].id, now).await);

    let db = require_db(&state).unwrap();
    let ics = calendar_for(db, room, a, now).await.unwrap();

    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    assert!(ics.contains(&format!("UID:{}@tempodraft.app", games[0].id)));
    assert!(ics.contains(&format!("SUMMARY:Toronto Tempo vs {}", games[0].opponent)));
    assert!(!ics.contains(&format!("UID:{}@tempodraft.app", games[1].id)));
}

// A rival writer lands between the checks and the write: each test plans
// under the room lock, writes the rival row in the same transaction, then
// commits the plan.

fn rival_pick(room_id: i64, participant_id: i64, season_game_id: i64, pick_number: i16) -> PickCreate {
    let now = factory::now();
    PickCreate {
        room_id,
        season_game_id,
        participant_id,
        pick_number,
        picked_at: now,
        undo_deadline: now,
    }
}

/// (rejection, valid picks left, room version before, room version after)
type RaceResult = (Option<DraftRejection>, usize, i32, i32);

#[actix_web::test]
async fn claim_between_check_and_write_is_item_already_claimed() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a, b) = (pair.room_id(), pair.alex.participant.id, pair.sam.participant.id);
    let x = factory::games(&state, room).await[0].id;
    let service = DraftService::new(&state.settings);

    let (outcome, valid, before, after): RaceResult = with_txn(&state, |txn| {
        Box::pin(async move {
            let plan = accepted(service.plan_pick(txn, room, a, x, now).await?);
            picks::append(txn, rival_pick(room, b, x, 5)).await?;
            let outcome = service.commit_pick(txn, plan.clone(), now).await?;
            let ledger = picks::load_ledger(txn, room).await?;
            let reloaded = rooms::require_by_id(txn, room).await?;
            Ok((outcome.rejection(), ledger.valid_count(), plan.room().lock_version, reloaded.lock_version))
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome, Some(DraftRejection::ItemAlreadyClaimed));
    // only the rival row survives
    assert_eq!(valid, 1);
    assert_eq!(after, before);
}

#[actix_web::test]
async fn pick_number_taken_between_check_and_write_is_a_turn_violation() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a, b) = (pair.room_id(), pair.alex.participant.id, pair.sam.participant.id);
    let games = factory::games(&state, room).await;
    let (x, y) = (games[0].id, games[1].id);
    let service = DraftService::new(&state.settings);

    let (outcome, claimed_x, before, after) = with_txn(&state, |txn| {
        Box::pin(async move {
            let plan = accepted(service.plan_pick(txn, room, a, x, now).await?);
            assert_eq!(plan.pick_number(), 0);
            picks::append(txn, rival_pick(room, b, y, 0)).await?;
            let outcome = service.commit_pick(txn, plan.clone(), now).await?;
            let ledger = picks::load_ledger(txn, room).await?;
            let reloaded = rooms::require_by_id(txn, room).await?;
            Ok((
                outcome.rejection(),
                ledger.is_claimed(x),
                plan.room().lock_version,
                reloaded.lock_version,
            ))
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome, Some(DraftRejection::TurnViolation));
    assert!(!claimed_x);
    assert_eq!(after, before);
}

#[actix_web::test]
async fn stale_room_version_rolls_back_the_pick_row() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;
    let service = DraftService::new(&state.settings);

    let (outcome, valid, bumped, after): RaceResult = with_txn(&state, |txn| {
        Box::pin(async move {
            let plan = accepted(service.plan_pick(txn, room, a, x, now).await?);
            // rival commit bumps the version the plan was checked against
            let bumped = rooms::update_room(txn, plan.room(), None, None, now).await?;
            let outcome = service.commit_pick(txn, plan, now).await?;
            let ledger = picks::load_ledger(txn, room).await?;
            let reloaded = rooms::require_by_id(txn, room).await?;
            Ok((outcome.rejection(), ledger.valid_count(), bumped.lock_version, reloaded.lock_version))
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome, Some(DraftRejection::TurnViolation));
    // the insert before the failed version check is gone too
    assert_eq!(valid, 0);
    assert_eq!(after, bumped);
}

#[actix_web::test]
async fn undo_after_a_rival_undo_is_not_latest() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;
    let picked = accepted(factory::pick(&state, room, a, x, now).await);
    let pick_id = picked.pick.id;
    let service = DraftService::new(&state.settings);

    let (outcome, before, after) = with_txn(&state, |txn| {
        Box::pin(async move {
            let plan = accepted(service.plan_undo(txn, room, a, pick_id, now).await?);
            picks::mark_undone(txn, pick_id, now).await?;
            let outcome = service.commit_undo(txn, plan.clone(), now).await?;
            let reloaded = rooms::require_by_id(txn, room).await?;
            Ok((outcome.rejection(), plan.room().lock_version, reloaded.lock_version))
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome, Some(DraftRejection::NotLatestPick));
    assert_eq!(after, before);
}

#[actix_web::test]
async fn stale_room_version_keeps_the_pick_valid() {
    let state = build_test_state().await.unwrap();
    let now = factory::now();
    let pair = factory::drafting_pair(&state, Coin::Heads, now).await;
    let (room, a) = (pair.room_id(), pair.alex.participant.id);
    let x = factory::games(&state, room).await[0].id;
    let picked = accepted(factory::pick(&state, room, a, x, now).await);
    let pick_id = picked.pick.id;
    let service = DraftService::new(&state.settings);

    let (outcome, still_claimed) = with_txn(&state, |txn| {
        Box::pin(async move {
            let plan = accepted(service.plan_undo(txn, room, a, pick_id, now).await?);
            rooms::update_room(txn, plan.room(), None, None, now).await?;
            let outcome = service.commit_undo(txn, plan, now).await?;
            let ledger = picks::load_ledger(txn, room).await?;
            Ok((outcome.rejection(), ledger.is_claimed(x)))
        })
    })
    .await
    .unwrap();

    assert_eq!(outcome, Some(DraftRejection::NotLatestPick));
    assert!(still_claimed);
}

async fn race_join(
    state: &draft_backend::AppState,
    room: i64,
    rival: fn(&PlannedJoin) -> Option<ParticipantCreate>,
    bump: bool,
) -> (Option<DraftRejection>, usize, RoomStatus) {
    let service = RoomService::new(&state.settings);
    let now = factory::now();
    with_txn(state, |txn| {
        Box::pin(async move {
            let plan = accepted(service.plan_join(txn, room, "Sam", now).await?);
            if let Some(dto) = rival(&plan) {
                participants::create_participant(txn, dto).await?;
            }
            if bump {
                rooms::update_room(txn, plan.room(), None, None, now).await?;
            }
            let outcome = service.commit_join(txn, plan, now).await?;
            let seated = participants::count_by_room(txn, room).await?;
            let reloaded = rooms::require_by_id(txn, room).await?;
            Ok((outcome.rejection(), seated, reloaded.status))
        })
    })
    .await
    .unwrap()
}

#[actix_web::test]
async fn seat_taken_between_check_and_write_is_room_full() {
    let state = build_test_state().await.unwrap();
    let host = factory::create_room(&state, "Alex", factory::now()).await;

    let rival = |plan: &PlannedJoin| {
        Some(ParticipantCreate {
            room_id: plan.room().id,
            display_name: "Kim".to_string(),
            seat: plan.seat(),
            session_hash: "rival-session".to_string(),
            joined_at: factory::now(),
        })
    };
    let (outcome, seated, status) = race_join(&state, host.room.id, rival, false).await;

    assert_eq!(outcome, Some(DraftRejection::RoomFull));
    assert_eq!(seated, 2);
    assert_eq!(status, RoomStatus::Waiting);
}

#[actix_web::test]
async fn stale_room_version_unseats_the_joiner() {
    let state = build_test_state().await.unwrap();
    let host = factory::create_room(&state, "Alex", factory::now()).await;

    let (outcome, seated, status) = race_join(&state, host.room.id, |_| None, true).await;

    assert_eq!(outcome, Some(DraftRejection::RoomFull));
    assert_eq!(seated, 1);
    assert_eq!(status, RoomStatus::Waiting);
}
