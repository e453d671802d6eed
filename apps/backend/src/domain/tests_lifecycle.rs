use time::{Duration, OffsetDateTime};

use super::lifecycle::{is_expired, status_after_pick, RoomGate, RoomStatus};
use super::outcome::DraftRejection;

fn now() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH + Duration::days(20_000)
}

fn gate(status: RoomStatus, participants: usize, first: Option<i64>) -> RoomGate {
    RoomGate {
        status,
        expires_at: now() + Duration::hours(1),
        participant_count: participants,
        first_picker_id: first,
    }
}

#[test]
fn transitions_only_move_forward_one_step() {
    use RoomStatus::*;
    let all = [Waiting, CoinToss, Drafting, Complete];
    for from in all {
        for to in all {
            let allowed = matches!(
                (from, to),
                (Waiting, CoinToss) | (CoinToss, Drafting) | (Drafting, Complete)
            );
            assert_eq!(from.can_transition_to(to), allowed, "{from} -> {to}");
        }
    }
    assert_eq!(Complete.next(), None);
}

#[test]
fn expiry_is_inclusive() {
    let at = now();
    assert!(is_expired(at, at));
    assert!(!is_expired(at, at - Duration::seconds(1)));
}

#[test]
fn expired_room_rejects_everything() {
    let mut g = gate(RoomStatus::Drafting, 2, Some(1));
    g.expires_at = now();
    assert_eq!(g.check_pick(3, now()), Err(DraftRejection::RoomExpired));
    assert_eq!(g.check_undo(now()), Err(DraftRejection::RoomExpired));
    assert_eq!(g.check_join(now()), Err(DraftRejection::RoomExpired));
    assert_eq!(g.check_coin_toss(now()), Err(DraftRejection::RoomExpired));
}

#[test]
fn join_needs_free_seat_in_waiting_room() {
    assert_eq!(gate(RoomStatus::Waiting, 1, None).check_join(now()), Ok(()));
    assert_eq!(
        gate(RoomStatus::Waiting, 2, None).check_join(now()),
        Err(DraftRejection::RoomFull)
    );
    assert_eq!(
        gate(RoomStatus::CoinToss, 2, None).check_join(now()),
        Err(DraftRejection::RoomFull)
    );
}

#[test]
fn coin_toss_happens_once() {
    assert_eq!(gate(RoomStatus::CoinToss, 2, None).check_coin_toss(now()), Ok(()));
    assert_eq!(
        gate(RoomStatus::Waiting, 1, None).check_coin_toss(now()),
        Err(DraftRejection::RoomNotInCoinToss)
    );
    assert_eq!(
        gate(RoomStatus::Drafting, 2, Some(7)).check_coin_toss(now()),
        Err(DraftRejection::RoomNotInCoinToss)
    );
}

#[test]
fn pick_gate_order() {
    assert_eq!(gate(RoomStatus::Drafting, 2, Some(1)).check_pick(17, now()), Ok(()));
    assert_eq!(
        gate(RoomStatus::Drafting, 2, Some(1)).check_pick(18, now()),
        Err(DraftRejection::DraftAlreadyComplete)
    );
    assert_eq!(
        gate(RoomStatus::Complete, 2, Some(1)).check_pick(18, now()),
        Err(DraftRejection::DraftAlreadyComplete)
    );
    assert_eq!(
        gate(RoomStatus::CoinToss, 2, None).check_pick(0, now()),
        Err(DraftRejection::RoomNotDrafting)
    );
}

#[test]
fn completed_draft_cannot_be_undone() {
    assert_eq!(
        gate(RoomStatus::Complete, 2, Some(1)).check_undo(now()),
        Err(DraftRejection::RoomNotDrafting)
    );
    assert_eq!(gate(RoomStatus::Drafting, 2, Some(1)).check_undo(now()), Ok(()));
}

#[test]
fn eighteenth_pick_completes() {
    assert_eq!(status_after_pick(17), RoomStatus::Drafting);
    assert_eq!(status_after_pick(18), RoomStatus::Complete);
}

#[test]
fn status_strings_match_storage() {
    assert_eq!(RoomStatus::CoinToss.as_str(), "coin_toss");
    assert_eq!(
        serde_json::to_value(RoomStatus::CoinToss).unwrap(),
        serde_json::json!("coin_toss")
    );
}
