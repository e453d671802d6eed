//! Room creation, joining and the coin toss.

use sea_orm::{ConnectionTrait, DatabaseTransaction, TransactionTrait};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::adapters::participants_sea::ParticipantCreate;
use crate::adapters::rooms_sea::RoomCreate;
use crate::config::DraftSettings;
use crate::domain::lifecycle::{RoomGate, RoomStatus, MAX_PARTICIPANTS};
use crate::domain::names::validate_display_name;
use crate::domain::outcome::{DraftRejection, Outcome};
use crate::domain::season::SEASON_2026;
use crate::domain::turn::TOTAL_TURNS;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::logging::pii::mask_name;
use crate::repos::participants::{self, Participant};
use crate::repos::rooms::{self, Room};
use crate::repos::season_games;
use crate::utils::join_code::generate_room_code;
use crate::utils::session_token;

/// Fresh codes tried before giving up on room creation.
const CODE_ATTEMPTS: usize = 8;

/// A participant seated in a room, with the raw session token issued once.
#[derive(Debug, Clone)]
pub struct Seated {
    pub room: Room,
    pub participant: Participant,
    pub session_token: String,
}

/// Outcome of the coin toss: which seat won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coin {
    Heads,
    Tails,
}

impl Coin {
    pub fn toss() -> Self {
        if rand::random_bool(0.5) {
            Coin::Heads
        } else {
            Coin::Tails
        }
    }

    /// Heads gives the room creator the first pick.
    fn seat(self) -> i16 {
        match self {
            Coin::Heads => 1,
            Coin::Tails => 2,
        }
    }
}

/// A join that found a free seat in `room`.
#[derive(Debug, Clone)]
pub struct PlannedJoin {
    room: Room,
    display_name: String,
    seat: i16,
    next_status: Option<RoomStatus>,
}

impl PlannedJoin {
    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn seat(&self) -> i16 {
        self.seat
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoomService {
    room_ttl: Duration,
}

impl RoomService {
    pub fn new(settings: &DraftSettings) -> Self {
        Self {
            room_ttl: settings.room_ttl,
        }
    }

    async fn seat_participant(
        txn: &DatabaseTransaction,
        room_id: i64,
        display_name: String,
        seat: i16,
        now: OffsetDateTime,
    ) -> Result<(Participant, String), AppError> {
        let issued = session_token::issue()?;
        let participant = participants::create_participant(
            txn,
            ParticipantCreate {
                room_id,
                display_name,
                seat,
                session_hash: issued.hash,
                joined_at: now,
            },
        )
        .await?;
        Ok((participant, issued.token))
    }

    /// Create a room seeded with the season catalog; the creator takes seat 1.
    pub async fn create_room(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
        now: OffsetDateTime,
    ) -> Result<Seated, AppError> {
        let display_name = validate_display_name(name)?;

        let mut code = None;
        for _ in 0..CODE_ATTEMPTS {
            let candidate = generate_room_code();
            if rooms::find_by_code(txn, &candidate).await?.is_none() {
                code = Some(candidate);
                break;
            }
            debug!(code = %candidate, "room code collision, regenerating");
        }
        let code = code.ok_or_else(|| {
            DomainError::conflict(ConflictKind::RoomCodeTaken, "Could not allocate a room code")
        })?;

        let room = rooms::create_room(
            txn,
            RoomCreate {
                code,
                total_turns: TOTAL_TURNS as i16,
                created_at: now,
                expires_at: now + self.room_ttl,
            },
        )
        .await?;
        season_games::seed_room(txn, room.id, &SEASON_2026).await?;

        let (participant, session_token) =
            Self::seat_participant(txn, room.id, display_name, 1, now).await?;

        info!(
            room_id = room.id,
            code = %room.code,
            creator = %mask_name(&participant.display_name),
            "room created"
        );

        Ok(Seated {
            room,
            participant,
            session_token,
        })
    }

    /// Take the second seat and move the room to `coin_toss`.
    pub async fn join_room(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        name: &str,
        now: OffsetDateTime,
    ) -> Result<Outcome<Seated>, AppError> {
        match self.plan_join(txn, room_id, name, now).await? {
            Outcome::Accepted(plan) => self.commit_join(txn, plan, now).await,
            Outcome::Rejected(rejection) => Ok(Outcome::Rejected(rejection)),
        }
    }

    /// Lock the room and check there is a free seat.
    pub async fn plan_join(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        name: &str,
        now: OffsetDateTime,
    ) -> Result<Outcome<PlannedJoin>, AppError> {
        let display_name = validate_display_name(name)?;

        let room = rooms::lock(txn, room_id).await?;
        let occupied = participants::count_by_room(txn, room_id).await?;
        let gate = RoomGate {
            status: room.status,
            expires_at: room.expires_at,
            participant_count: occupied,
            first_picker_id: room.first_picker_id,
        };
        if let Err(rejection) = gate.check_join(now) {
            return Ok(Outcome::Rejected(rejection));
        }

        let next_status = if occupied + 1 == MAX_PARTICIPANTS {
            Some(RoomStatus::CoinToss)
        } else {
            None
        };
        Ok(Outcome::Accepted(PlannedJoin {
            room,
            display_name,
            seat: (occupied + 1) as i16,
            next_status,
        }))
    }

    /// Seat the joiner and bump the room together; a lost race leaves neither.
    pub async fn commit_join(
        &self,
        txn: &DatabaseTransaction,
        plan: PlannedJoin,
        now: OffsetDateTime,
    ) -> Result<Outcome<Seated>, AppError> {
        let PlannedJoin {
            room,
            display_name,
            seat,
            next_status,
        } = plan;
        let room_id = room.id;

        let savepoint = txn.begin().await?;
        let written = match Self::seat_participant(&savepoint, room_id, display_name, seat, now).await {
            Ok((participant, token)) => rooms::update_room(&savepoint, &room, next_status, None, now)
                .await
                .map(|room| (room, participant, token))
                .map_err(AppError::from),
            Err(err) => Err(err),
        };
        let (room, participant, session_token) = match written {
            Ok(written) => {
                savepoint.commit().await?;
                written
            }
            Err(err) => {
                savepoint.rollback().await?;
                return match err {
                    AppError::Rejected(DraftRejection::RoomFull)
                    | AppError::Conflict {
                        code: ErrorCode::OptimisticLock,
                        ..
                    } => {
                        warn!(room_id, seat, "join lost a race");
                        Ok(Outcome::Rejected(DraftRejection::RoomFull))
                    }
                    other => Err(other),
                };
            }
        };

        info!(
            room_id,
            seat,
            participant = %mask_name(&participant.display_name),
            "participant joined"
        );

        Ok(Outcome::Accepted(Seated {
            room,
            participant,
            session_token,
        }))
    }

    /// Record the coin toss: first picker and the move to `drafting` in one write.
    pub async fn assign_first_picker(
        &self,
        txn: &DatabaseTransaction,
        room_id: i64,
        coin: Coin,
        now: OffsetDateTime,
    ) -> Result<Outcome<Room>, AppError> {
        let room = rooms::lock(txn, room_id).await?;
        let seated = participants::find_by_room(txn, room_id).await?;
        let gate = RoomGate {
            status: room.status,
            expires_at: room.expires_at,
            participant_count: seated.len(),
            first_picker_id: room.first_picker_id,
        };
        if let Err(rejection) = gate.check_coin_toss(now) {
            return Ok(Outcome::Rejected(rejection));
        }

        let Some(first) = seated.iter().find(|p| p.seat == coin.seat()) else {
            return Ok(Outcome::Rejected(DraftRejection::RoomNotInCoinToss));
        };

        let room = match rooms::update_room(
            txn,
            &room,
            Some(RoomStatus::Drafting),
            Some(first.id),
            now,
        )
        .await
        {
            Ok(room) => room,
            Err(DomainError::Conflict(ConflictKind::OptimisticLock, _)) => {
                return Ok(Outcome::Rejected(DraftRejection::RoomNotInCoinToss));
            }
            Err(other) => return Err(other.into()),
        };

        info!(room_id, first_picker_id = first.id, ?coin, "first picker assigned");
        Ok(Outcome::Accepted(room))
    }
}

/// Participant bound to `token` in the given room, if any.
pub async fn participant_for_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    token: &str,
) -> Result<Option<Participant>, DomainError> {
    let hash = session_token::hash_token(token);
    participants::find_by_session(conn, room_id, &hash).await
}
