//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repos convert through `map_db_err`
//! (or `?` via the `From` impl below). Unique-index names are matched for
//! Postgres and `table.column` lists for SQLite, so both engines surface
//! the same conflict kinds.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(&format!("SQLSTATE({code})")) || msg.contains(&format!("code: {code}"))
}

/// SQLITE_BUSY, SQLITE_LOCKED and their extended codes.
fn sqlite_busy(msg: &str) -> bool {
    const CODES: [&str; 6] = ["5", "6", "261", "262", "517", "773"];
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("database schema is locked")
        || CODES.iter().any(|c| msg.contains(&format!("(code: {c})")))
}

/// Match a unique violation by Postgres constraint name or SQLite column list.
fn unique_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    let hit = |pg_name: &str, sqlite_cols: &str| {
        error_msg.contains(pg_name) || error_msg.contains(sqlite_cols)
    };

    if hit("picks_room_game_active_key", "picks.season_game_id") {
        return Some((ConflictKind::ItemClaimed, "Season game already claimed"));
    }
    if hit("picks_room_number_active_key", "picks.pick_number") {
        return Some((ConflictKind::PickNumberTaken, "Pick number already taken"));
    }
    if hit("rooms_code_key", "rooms.code") {
        return Some((ConflictKind::RoomCodeTaken, "Room code already exists"));
    }
    if hit("participants_room_seat_key", "participants.seat") {
        return Some((ConflictKind::SeatTaken, "Seat already taken"));
    }
    if hit("participants_session_hash_key", "participants.session_hash") {
        return Some((
            ConflictKind::Other("SessionHash".into()),
            "Session already registered",
        ));
    }
    None
}

fn not_found_from_custom(msg: &str) -> Option<DomainError> {
    let (prefix, rest) = msg.split_once(':')?;
    let kind = match prefix {
        "ROOM_NOT_FOUND" => NotFoundKind::Room,
        "PICK_NOT_FOUND" => NotFoundKind::Pick,
        "PARTICIPANT_NOT_FOUND" => NotFoundKind::Participant,
        _ => return None,
    };
    Some(DomainError::not_found(kind, format!("{} {rest} not found", label(prefix))))
}

fn label(prefix: &str) -> &'static str {
    match prefix {
        "ROOM_NOT_FOUND" => "Room",
        "PICK_NOT_FOUND" => "Pick",
        _ => "Participant",
    }
}

/// Translate a `DbErr` into a `DomainError` with PII-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with("OPTIMISTIC_LOCK:") => {
            #[derive(serde::Deserialize)]
            struct LockInfo {
                expected: i32,
                actual: i32,
            }

            let info = msg
                .strip_prefix("OPTIMISTIC_LOCK:")
                .and_then(|json| serde_json::from_str::<LockInfo>(json).ok());
            return match info {
                Some(info) => {
                    warn!(
                        trace_id = %trace_id,
                        expected = info.expected,
                        actual = info.actual,
                        "Optimistic lock conflict detected"
                    );
                    DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        format!(
                            "Room was modified concurrently (expected version {}, actual version {})",
                            info.expected, info.actual
                        ),
                    )
                }
                None => {
                    warn!(trace_id = %trace_id, "Optimistic lock conflict detected (version info unavailable)");
                    DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        "Room was modified by another transaction",
                    )
                }
            };
        }
        sea_orm::DbErr::Custom(msg) => {
            if let Some(not_found) = not_found_from_custom(msg) {
                return not_found;
            }
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if sqlite_busy(&error_msg) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database busy");
        return DomainError::infra(InfraErrorKind::Timeout, "Database is busy, retry shortly");
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unique constraint violation");
        if let Some((kind, detail)) = unique_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if mentions_sqlstate(&error_msg, "23514") || error_msg.contains("CHECK constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Check constraint violation");
        return DomainError::validation_other("Check constraint violation");
    }

    if error_msg.contains("timeout") || error_msg.contains("timed out") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
