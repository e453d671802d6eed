//! DTOs for rooms_sea adapter.

use time::OffsetDateTime;

use crate::entities::rooms::RoomStatus;

/// DTO for inserting a room in `waiting`.
#[derive(Debug, Clone)]
pub struct RoomCreate {
    pub code: String,
    pub total_turns: i16,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Compare-and-swap update of a room.
///
/// Every update bumps `lock_version` once, even when no column changes;
/// picks and undos rely on that so snapshot versions move.
#[derive(Debug, Clone)]
pub struct RoomUpdate {
    pub id: i64,
    pub expected_version: i32,
    pub status: Option<RoomStatus>,
    pub first_picker_id: Option<i64>,
    pub updated_at: OffsetDateTime,
}

impl RoomUpdate {
    pub fn new(id: i64, expected_version: i32, updated_at: OffsetDateTime) -> Self {
        Self {
            id,
            expected_version,
            status: None,
            first_picker_id: None,
            updated_at,
        }
    }

    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_first_picker(mut self, participant_id: i64) -> Self {
        self.first_picker_id = Some(participant_id);
        self
    }
}
