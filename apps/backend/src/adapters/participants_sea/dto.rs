//! DTOs for participants_sea adapter.

use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct ParticipantCreate {
    pub room_id: i64,
    pub display_name: String,
    pub seat: i16,
    pub session_hash: String,
    pub joined_at: OffsetDateTime,
}
