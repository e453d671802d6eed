//! SeaORM adapter for the pick ledger.
//!
//! Rows are appended and later only ever get `undone_at` set.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::picks;

pub mod dto;

pub use dto::PickCreate;

/// Every pick of a room, undone history included, in ledger order.
pub async fn find_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<picks::Model>, sea_orm::DbErr> {
    picks::Entity::find()
        .filter(picks::Column::RoomId.eq(room_id))
        .order_by_asc(picks::Column::PickNumber)
        .order_by_asc(picks::Column::Id)
        .all(conn)
        .await
}

pub async fn create_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PickCreate,
) -> Result<picks::Model, sea_orm::DbErr> {
    let pick = picks::ActiveModel {
        id: NotSet,
        room_id: Set(dto.room_id),
        season_game_id: Set(dto.season_game_id),
        participant_id: Set(dto.participant_id),
        pick_number: Set(dto.pick_number),
        picked_at: Set(dto.picked_at),
        undo_deadline: Set(dto.undo_deadline),
        undone_at: Set(None),
    };
    pick.insert(conn).await
}

/// Mark a still-valid pick as undone. Fails when it was undone already.
pub async fn mark_undone<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    pick_id: i64,
    at: OffsetDateTime,
) -> Result<(), sea_orm::DbErr> {
    let result = picks::Entity::update_many()
        .col_expr(picks::Column::UndoneAt, Expr::value(Some(at)))
        .filter(picks::Column::Id.eq(pick_id))
        .filter(picks::Column::UndoneAt.is_null())
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::Custom(format!("PICK_NOT_FOUND:{pick_id}")));
    }
    Ok(())
}
