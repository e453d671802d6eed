//! Season game repository functions.

use sea_orm::ConnectionTrait;

use crate::adapters::season_games_sea as season_games_adapter;
use crate::domain::season::CatalogGame;
use crate::domain::snapshot::GameRow;
use crate::entities::season_games;
use crate::errors::domain::DomainError;

pub type SeasonGame = GameRow;

impl From<season_games::Model> for GameRow {
    fn from(m: season_games::Model) -> Self {
        Self {
            id: m.id,
            opponent: m.opponent,
            venue: m.venue,
            game_date: m.game_date,
            game_time: m.game_time,
            is_marquee: m.is_marquee,
            is_family: m.is_family,
        }
    }
}

pub async fn find_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<SeasonGame>, DomainError> {
    let rows = season_games_adapter::find_by_room(conn, room_id).await?;
    Ok(rows.into_iter().map(GameRow::from).collect())
}

pub async fn find_in_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    season_game_id: i64,
) -> Result<Option<SeasonGame>, DomainError> {
    let row = season_games_adapter::find_in_room(conn, room_id, season_game_id).await?;
    Ok(row.map(GameRow::from))
}

/// Copy the catalog into the room.
pub async fn seed_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    catalog: &[CatalogGame],
) -> Result<(), DomainError> {
    let rows = catalog
        .iter()
        .map(|g| season_games_adapter::SeasonGameCreate {
            room_id,
            opponent: g.opponent.to_string(),
            venue: g.venue.to_string(),
            game_date: g.date,
            game_time: g.time,
            is_marquee: g.is_marquee,
            is_family: g.is_family(),
        })
        .collect();
    season_games_adapter::insert_many(conn, rows).await?;
    Ok(())
}
