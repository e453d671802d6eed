//! DTOs for season_games_sea adapter.

use time::{Date, Time};

#[derive(Debug, Clone)]
pub struct SeasonGameCreate {
    pub room_id: i64,
    pub opponent: String,
    pub venue: String,
    pub game_date: Date,
    pub game_time: Time,
    pub is_marquee: bool,
    pub is_family: bool,
}
