//! DTOs for picks_sea adapter.

use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct PickCreate {
    pub room_id: i64,
    pub season_game_id: i64,
    pub participant_id: i64,
    pub pick_number: i16,
    pub picked_at: OffsetDateTime,
    pub undo_deadline: OffsetDateTime,
}
