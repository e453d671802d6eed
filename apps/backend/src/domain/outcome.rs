//! Business-rule outcomes of draft operations.
//!
//! A rejected pick or undo is an expected answer, not a failure: services
//! return `Outcome::Rejected` inside `Ok`, and only the HTTP edge turns it
//! into a problem response.

use serde::Serialize;

use crate::errors::ErrorCode;

/// Why a draft operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftRejection {
    RoomNotDrafting,
    RoomExpired,
    TurnViolation,
    ItemAlreadyClaimed,
    DraftAlreadyComplete,
    NotOwner,
    NotLatestPick,
    WindowExpired,
    RoomFull,
    RoomNotInCoinToss,
}

impl DraftRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            DraftRejection::RoomNotDrafting => ErrorCode::RoomNotDrafting,
            DraftRejection::RoomExpired => ErrorCode::RoomExpired,
            DraftRejection::TurnViolation => ErrorCode::TurnViolation,
            DraftRejection::ItemAlreadyClaimed => ErrorCode::ItemAlreadyClaimed,
            DraftRejection::DraftAlreadyComplete => ErrorCode::DraftAlreadyComplete,
            DraftRejection::NotOwner => ErrorCode::NotOwner,
            DraftRejection::NotLatestPick => ErrorCode::NotLatestPick,
            DraftRejection::WindowExpired => ErrorCode::WindowExpired,
            DraftRejection::RoomFull => ErrorCode::RoomFull,
            DraftRejection::RoomNotInCoinToss => ErrorCode::RoomNotInCoinToss,
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            DraftRejection::RoomNotDrafting => "Room is not accepting picks",
            DraftRejection::RoomExpired => "Room has expired",
            DraftRejection::TurnViolation => "It is not your turn",
            DraftRejection::ItemAlreadyClaimed => "Game has already been picked",
            DraftRejection::DraftAlreadyComplete => "Draft is already complete",
            DraftRejection::NotOwner => "Only the participant who made the pick can undo it",
            DraftRejection::NotLatestPick => "Only the most recent pick can be undone",
            DraftRejection::WindowExpired => "Undo window has passed",
            DraftRejection::RoomFull => "Room already has two participants",
            DraftRejection::RoomNotInCoinToss => "Room is not waiting for a coin toss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Accepted(T),
    Rejected(DraftRejection),
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<DraftRejection> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(r) => Some(*r),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Accepted(v) => Outcome::Accepted(f(v)),
            Outcome::Rejected(r) => Outcome::Rejected(r),
        }
    }

    /// Accepted value, or the rejection as an `Err` for the HTTP edge.
    pub fn into_result(self) -> Result<T, DraftRejection> {
        match self {
            Outcome::Accepted(v) => Ok(v),
            Outcome::Rejected(r) => Err(r),
        }
    }
}
