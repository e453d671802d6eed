//! Repository functions: adapters in, domain types and `DomainError` out.

pub mod participants;
pub mod picks;
pub mod rooms;
pub mod season_games;
