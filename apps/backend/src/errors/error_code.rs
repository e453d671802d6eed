//! Error codes for the draft API.
//!
//! Every problem-details response carries one of these codes. Add new codes
//! here; never pass ad-hoc strings as error codes.

use core::fmt;

/// Centralized error codes. Each variant maps to the SCREAMING_SNAKE_CASE
/// string that appears in HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Session
    /// No session token presented
    Unauthorized,
    /// Token is not bound to a participant of the addressed room
    UnauthorizedInvalidSession,

    // Request validation
    /// Room code is not 6 characters of [A-Z0-9]
    InvalidRoomCode,
    /// Display name empty or too long
    InvalidName,
    /// Path parameter could not be parsed
    InvalidPathParam,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,
    /// Invalid or missing HTTP header
    InvalidHeader,

    // Not found
    RoomNotFound,
    SeasonGameNotFound,
    PickNotFound,
    ParticipantNotFound,
    NotFound,

    // Draft rejections
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

    // Conflicts
    /// Room code collision on insert
    RoomCodeConflict,
    /// Optimistic lock conflict
    OptimisticLock,
    /// Unique constraint violation with no specific mapping
    UniqueViolation,
    /// Generic conflict
    Conflict,

    // System
    DbError,
    DbUnavailable,
    DbTimeout,
    Internal,
    ConfigError,
    DataCorruption,
}

impl ErrorCode {
    /// Returns the canonical string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedInvalidSession => "UNAUTHORIZED_INVALID_SESSION",

            Self::InvalidRoomCode => "INVALID_ROOM_CODE",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidPathParam => "INVALID_PATH_PARAM",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",

            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::SeasonGameNotFound => "SEASON_GAME_NOT_FOUND",
            Self::PickNotFound => "PICK_NOT_FOUND",
            Self::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::RoomNotDrafting => "ROOM_NOT_DRAFTING",
            Self::RoomExpired => "ROOM_EXPIRED",
            Self::TurnViolation => "TURN_VIOLATION",
            Self::ItemAlreadyClaimed => "ITEM_ALREADY_CLAIMED",
            Self::DraftAlreadyComplete => "DRAFT_ALREADY_COMPLETE",
            Self::NotOwner => "NOT_OWNER",
            Self::NotLatestPick => "NOT_LATEST_PICK",
            Self::WindowExpired => "WINDOW_EXPIRED",
            Self::RoomFull => "ROOM_FULL",
            Self::RoomNotInCoinToss => "ROOM_NOT_IN_COIN_TOSS",

            Self::RoomCodeConflict => "ROOM_CODE_CONFLICT",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
