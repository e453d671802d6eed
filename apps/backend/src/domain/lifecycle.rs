//! Room lifecycle: waiting -> coin_toss -> drafting -> complete.
//!
//! Each gate returns the rejection that blocks an operation, checked in a
//! fixed order so callers racing on the same room see consistent answers.
//! Expiry wins over everything else.

use time::OffsetDateTime;

use super::outcome::DraftRejection;
use super::turn::TOTAL_TURNS;
pub use crate::entities::rooms::RoomStatus;

/// Seats per room.
pub const MAX_PARTICIPANTS: usize = 2;

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::CoinToss => "coin_toss",
            RoomStatus::Drafting => "drafting",
            RoomStatus::Complete => "complete",
        }
    }

    /// The only status this one may move to.
    pub fn next(&self) -> Option<RoomStatus> {
        match self {
            RoomStatus::Waiting => Some(RoomStatus::CoinToss),
            RoomStatus::CoinToss => Some(RoomStatus::Drafting),
            RoomStatus::Drafting => Some(RoomStatus::Complete),
            RoomStatus::Complete => None,
        }
    }

    pub fn can_transition_to(&self, to: RoomStatus) -> bool {
        self.next() == Some(to)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_expired(expires_at: OffsetDateTime, now: OffsetDateTime) -> bool {
    now >= expires_at
}

/// Room facts the gates look at, read under the room lock.
#[derive(Debug, Clone, Copy)]
pub struct RoomGate {
    pub status: RoomStatus,
    pub expires_at: OffsetDateTime,
    pub participant_count: usize,
    pub first_picker_id: Option<i64>,
}

impl RoomGate {
    fn live(&self, now: OffsetDateTime) -> Result<(), DraftRejection> {
        if is_expired(self.expires_at, now) {
            Err(DraftRejection::RoomExpired)
        } else {
            Ok(())
        }
    }

    pub fn check_join(&self, now: OffsetDateTime) -> Result<(), DraftRejection> {
        self.live(now)?;
        if self.participant_count >= MAX_PARTICIPANTS || self.status != RoomStatus::Waiting {
            return Err(DraftRejection::RoomFull);
        }
        Ok(())
    }

    pub fn check_coin_toss(&self, now: OffsetDateTime) -> Result<(), DraftRejection> {
        self.live(now)?;
        if self.status != RoomStatus::CoinToss
            || self.participant_count != MAX_PARTICIPANTS
            || self.first_picker_id.is_some()
        {
            return Err(DraftRejection::RoomNotInCoinToss);
        }
        Ok(())
    }

    pub fn check_pick(&self, valid_count: usize, now: OffsetDateTime) -> Result<(), DraftRejection> {
        self.live(now)?;
        if self.status == RoomStatus::Complete || valid_count >= TOTAL_TURNS {
            return Err(DraftRejection::DraftAlreadyComplete);
        }
        if self.status != RoomStatus::Drafting {
            return Err(DraftRejection::RoomNotDrafting);
        }
        Ok(())
    }

    /// A completed draft is final, so undo needs `drafting` as well.
    pub fn check_undo(&self, now: OffsetDateTime) -> Result<(), DraftRejection> {
        self.live(now)?;
        if self.status != RoomStatus::Drafting {
            return Err(DraftRejection::RoomNotDrafting);
        }
        Ok(())
    }
}

/// Status after a pick lands and the ledger holds `valid_count` picks.
pub fn status_after_pick(valid_count: usize) -> RoomStatus {
    if valid_count >= TOTAL_TURNS {
        RoomStatus::Complete
    } else {
        RoomStatus::Drafting
    }
}
