//! Pick commit and undo.
//!
//! Both run inside the caller's transaction after locking the room row.
//! Rejections come back as `Outcome::Rejected`; only infrastructure
//! failures and unknown ids are `Err`.

use sea_orm::{DatabaseTransaction, TransactionTrait};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::adapters::picks_sea::PickCreate;
use crate::config::DraftSettings;
use crate::domain::ledger::{LedgerPick, PickLedger};
use crate::domain::lifecycle::{status_after_pick, RoomGate, RoomStatus};
use crate::domain::outcome::{DraftRejection, Outcome};
use crate::domain::turn::{resolve_turn, Turn};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::repos::participants::{self, Participant};
use crate::repos::rooms::{self, Room};
use crate::repos::{picks, season_games};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickAccepted {
    pub pick: LedgerPick,
    pub room: Room,
    pub next_turn: Turn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickUndone {
    pub pick: LedgerPick,
    pub room: Room,
    pub next_turn: Turn,
}

/// A pick that passed every check, bound to the room version it was
/// checked against. Committing it may still lose to a concurrent writer.
#[derive(Debug, Clone)]
pub struct PlannedPick {
    room: Room,
    dto: PickCreate,
    next_status: RoomStatus,
    next_turn: Turn,
}

impl PlannedPick {
    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn pick_number(&self) -> i16 {
        self.dto.pick_number
    }
}

/// An undo that passed every check against `room`.
#[derive(Debug, Clone)]
pub struct PlannedUndo {
    room: Room,
    pick: LedgerPick,
    next_turn: Turn,
}

impl PlannedUndo {
    pub fn room(&self) -> &Room {
        &self.room
    }
}

/// Everything the commit protocol reads under the room lock.
struct LockedRoom {
    room: Room,
    participants: Vec<Participant>,
    ledger: PickLedger,
}

impl LockedRoom {
    async fn load(txn: &DatabaseTransaction, room_id: i64) -> Result<Self, DomainError> {
        let room = rooms::lock(txn, room_id).await?;
        let participants = participants::find_by_room(txn, room_id).await?;
        let ledger = picks::load_ledger(txn, room_id).await?;
        Ok(Self {
            room,
            participants,
            ledger,
        })
    }

    fn gate(&self) -> RoomGate {
        RoomGate {
            status: self.room.status,
            expires_at: self.room.expires_at,
            participant_count: self.participants.len(),
            first_picker_id: self.room.first_picker_id,
        }
    }

    fn participant_ids(&self) -> Vec<i64> {
        self.participants.iter().map(|p| p.id).collect()
    }

    fn turn_after(&self, valid_count: usize) -> Turn {
        resolve_turn(valid_count, &self.participant_ids(), self.room.first_picker_id)
    }
}

/// Insert the pick and bump the room in one step.
async fn write_pick(
    conn: &DatabaseTransaction,
    room: &Room,
    dto: PickCreate,
    status: RoomStatus,
    now: OffsetDateTime,
) -> Result<(LedgerPick, Room), DomainError> {
    let pick = picks::append(conn, dto).await?;
    let room = rooms::update_room(conn, room, Some(status), None, now).await?;
    Ok((pick, room))
}

async fn write_undo(
    conn: &DatabaseTransaction,
    room: &Room,
    pick_id: i64,
    now: OffsetDateTime,
) -> Result<Room, DomainError> {
    picks::mark_undone(conn, pick_id, now).await?;
    rooms::update_room(conn, room, None, None, now).await
}

/// Map a racing writer's conflict to the rejection the loser should see.
fn race_rejection(err: DomainError, on_lock: DraftRejection) -> Result<DraftRejection, DomainError> {
    match err {
        DomainError::Conflict(ConflictKind::ItemClaimed, _) => Ok(DraftRejection::ItemAlreadyClaimed),
        DomainError::Conflict(ConflictKind::PickNumberTaken, _) => Ok(DraftRejection::TurnViolation),
        DomainError::Conflict(ConflictKind::OptimisticLock, _) => Ok(on_lock),
        other => Err(other),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DraftService {
    undo_window: Duration,
}

impl DraftService {
    pub fn new(settings: &DraftSettings) -> Self {
        Self {
            undo_window: settings.undo_window,
        }
    }

    /// Validate and record one pick.
    pub async fn attempt_pick(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        participant_id: i64,
        season_game_id: i64,
        now: OffsetDateTime,
    ) -> Result<Outcome<PickAccepted>, DomainError> {
        match self
            .plan_pick(txn, room_id, participant_id, season_game_id, now)
            .await?
        {
            Outcome::Accepted(plan) => self.commit_pick(txn, plan, now).await,
            Outcome::Rejected(rejection) => Ok(Outcome::Rejected(rejection)),
        }
    }

    /// Lock the room and run the pick checks.
    ///
    /// Checks run in a fixed order: expiry, completion, drafting status,
    /// item ownership, claim, turn. The pick number is the valid count at
    /// check time.
    pub async fn plan_pick(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        participant_id: i64,
        season_game_id: i64,
        now: OffsetDateTime,
    ) -> Result<Outcome<PlannedPick>, DomainError> {
        let locked = LockedRoom::load(txn, room_id).await?;
        let valid_count = locked.ledger.valid_count();

        if let Err(rejection) = locked.gate().check_pick(valid_count, now) {
            debug!(room_id, participant_id, ?rejection, "pick blocked by room state");
            return Ok(Outcome::Rejected(rejection));
        }

        if season_games::find_in_room(txn, room_id, season_game_id)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found(
                NotFoundKind::SeasonGame,
                format!("Season game {season_game_id} is not part of this room"),
            ));
        }

        if locked.ledger.is_claimed(season_game_id) {
            return Ok(Outcome::Rejected(DraftRejection::ItemAlreadyClaimed));
        }

        if locked.turn_after(valid_count).picker() != Some(participant_id) {
            return Ok(Outcome::Rejected(DraftRejection::TurnViolation));
        }

        let new_count = valid_count + 1;
        Ok(Outcome::Accepted(PlannedPick {
            dto: PickCreate {
                room_id,
                season_game_id,
                participant_id,
                pick_number: locked.ledger.next_pick_number(),
                picked_at: now,
                undo_deadline: now + self.undo_window,
            },
            next_status: status_after_pick(new_count),
            next_turn: locked.turn_after(new_count),
            room: locked.room,
        }))
    }

    /// Write a planned pick and bump the room version it was checked against.
    ///
    /// A conflicting writer rolls the savepoint back, so the caller's
    /// transaction keeps neither the pick row nor the room bump.
    pub async fn commit_pick(
        &self,
        txn: &DatabaseTransaction,
        plan: PlannedPick,
        now: OffsetDateTime,
    ) -> Result<Outcome<PickAccepted>, DomainError> {
        let PlannedPick {
            room,
            dto,
            next_status,
            next_turn,
        } = plan;
        let (room_id, participant_id) = (dto.room_id, dto.participant_id);
        let (season_game_id, pick_number) = (dto.season_game_id, dto.pick_number);

        let savepoint = txn.begin().await?;
        let (pick, room) = match write_pick(&savepoint, &room, dto, next_status, now).await {
            Ok(written) => {
                savepoint.commit().await?;
                written
            }
            Err(err) => {
                savepoint.rollback().await?;
                let rejection = race_rejection(err, DraftRejection::TurnViolation)?;
                warn!(room_id, participant_id, ?rejection, "pick lost a race");
                return Ok(Outcome::Rejected(rejection));
            }
        };

        info!(
            room_id,
            participant_id,
            season_game_id,
            pick_number,
            complete = next_status == RoomStatus::Complete,
            "pick recorded"
        );

        Ok(Outcome::Accepted(PickAccepted {
            pick,
            room,
            next_turn,
        }))
    }

    /// Retract the caller's latest pick while its undo window is open.
    pub async fn undo(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        participant_id: i64,
        pick_id: i64,
        now: OffsetDateTime,
    ) -> Result<Outcome<PickUndone>, DomainError> {
        match self.plan_undo(txn, room_id, participant_id, pick_id, now).await? {
            Outcome::Accepted(plan) => self.commit_undo(txn, plan, now).await,
            Outcome::Rejected(rejection) => Ok(Outcome::Rejected(rejection)),
        }
    }

    pub async fn plan_undo(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        participant_id: i64,
        pick_id: i64,
        now: OffsetDateTime,
    ) -> Result<Outcome<PlannedUndo>, DomainError> {
        let locked = LockedRoom::load(txn, room_id).await?;

        if let Err(rejection) = locked.gate().check_undo(now) {
            return Ok(Outcome::Rejected(rejection));
        }

        let Some(pick) = locked.ledger.get(pick_id).cloned() else {
            return Err(DomainError::not_found(
                NotFoundKind::Pick,
                format!("Pick {pick_id} not found"),
            ));
        };

        if pick.participant_id != participant_id {
            return Ok(Outcome::Rejected(DraftRejection::NotOwner));
        }
        let is_latest = locked.ledger.latest_valid().map(|p| p.id) == Some(pick.id);
        if !pick.is_valid() || !is_latest {
            return Ok(Outcome::Rejected(DraftRejection::NotLatestPick));
        }
        if now >= pick.undo_deadline {
            return Ok(Outcome::Rejected(DraftRejection::WindowExpired));
        }

        let remaining = locked.ledger.valid_count().saturating_sub(1);
        Ok(Outcome::Accepted(PlannedUndo {
            next_turn: locked.turn_after(remaining),
            room: locked.room,
            pick,
        }))
    }

    pub async fn commit_undo(
        &self,
        txn: &DatabaseTransaction,
        plan: PlannedUndo,
        now: OffsetDateTime,
    ) -> Result<Outcome<PickUndone>, DomainError> {
        let PlannedUndo {
            room,
            pick,
            next_turn,
        } = plan;
        let (room_id, participant_id, pick_id) = (room.id, pick.participant_id, pick.id);

        let savepoint = txn.begin().await?;
        let room = match write_undo(&savepoint, &room, pick_id, now).await {
            Ok(room) => {
                savepoint.commit().await?;
                room
            }
            Err(err) => {
                savepoint.rollback().await?;
                let rejection = match err {
                    DomainError::NotFound(NotFoundKind::Pick, _) => DraftRejection::NotLatestPick,
                    other => race_rejection(other, DraftRejection::NotLatestPick)?,
                };
                warn!(room_id, participant_id, ?rejection, "undo lost a race");
                return Ok(Outcome::Rejected(rejection));
            }
        };

        info!(room_id, participant_id, pick_id, "pick undone");

        let pick = LedgerPick {
            undone_at: Some(now),
            ..pick
        };
        Ok(Outcome::Accepted(PickUndone {
            pick,
            room,
            next_turn,
        }))
    }
}
