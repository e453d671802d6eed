//! Draft timing configuration loaded from the environment.
//!
//! - `DRAFT_UNDO_WINDOW_SECS`: grace period for retracting the latest pick (default 30)
//! - `DRAFT_ROOM_TTL_SECS`: room lifetime from creation (default 3600)

use std::env;

use time::Duration;

use crate::error::AppError;

pub const DEFAULT_UNDO_WINDOW_SECS: i64 = 30;
pub const DEFAULT_ROOM_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftSettings {
    pub undo_window: Duration,
    pub room_ttl: Duration,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            undo_window: Duration::seconds(DEFAULT_UNDO_WINDOW_SECS),
            room_ttl: Duration::seconds(DEFAULT_ROOM_TTL_SECS),
        }
    }
}

impl DraftSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            undo_window: Duration::seconds(positive_secs(
                "DRAFT_UNDO_WINDOW_SECS",
                DEFAULT_UNDO_WINDOW_SECS,
            )?),
            room_ttl: Duration::seconds(positive_secs(
                "DRAFT_ROOM_TTL_SECS",
                DEFAULT_ROOM_TTL_SECS,
            )?),
        })
    }

    pub fn with_undo_window(mut self, undo_window: Duration) -> Self {
        self.undo_window = undo_window;
        self
    }

    pub fn with_room_ttl(mut self, room_ttl: Duration) -> Self {
        self.room_ttl = room_ttl;
        self
    }
}

fn positive_secs(name: &str, default: i64) -> Result<i64, AppError> {
    let raw = match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(default),
    };
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::config(format!(
            "{name} must be a positive number of seconds, got '{raw}'"
        ))),
    }
}
