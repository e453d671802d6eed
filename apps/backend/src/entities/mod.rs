pub mod participants;
pub mod picks;
pub mod rooms;
pub mod season_games;
