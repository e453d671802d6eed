//! SeaORM adapters. Functions return `DbErr`; repos map to `DomainError`.

pub mod participants_sea;
pub mod picks_sea;
pub mod rooms_sea;
pub mod season_games_sea;
