//! SeaORM adapter for season games. Rows are written once at room creation.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set,
};

use crate::entities::season_games;

pub mod dto;

pub use dto::SeasonGameCreate;

pub async fn find_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<season_games::Model>, sea_orm::DbErr> {
    season_games::Entity::find()
        .filter(season_games::Column::RoomId.eq(room_id))
        .order_by_asc(season_games::Column::GameDate)
        .order_by_asc(season_games::Column::GameTime)
        .order_by_asc(season_games::Column::Id)
        .all(conn)
        .await
}

pub async fn find_in_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    season_game_id: i64,
) -> Result<Option<season_games::Model>, sea_orm::DbErr> {
    season_games::Entity::find_by_id(season_game_id)
        .filter(season_games::Column::RoomId.eq(room_id))
        .one(conn)
        .await
}

/// Bulk insert; a room is seeded in one statement.
pub async fn insert_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    rows: Vec<SeasonGameCreate>,
) -> Result<(), sea_orm::DbErr> {
    if rows.is_empty() {
        return Ok(());
    }
    let models = rows.into_iter().map(|row| season_games::ActiveModel {
        id: NotSet,
        room_id: Set(row.room_id),
        opponent: Set(row.opponent),
        venue: Set(row.venue),
        game_date: Set(row.game_date),
        game_time: Set(row.game_time),
        is_marquee: Set(row.is_marquee),
        is_family: Set(row.is_family),
    });
    season_games::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}
