//! SeaORM adapter for rooms - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QuerySelect, Set,
};

use crate::entities::rooms;

pub mod dto;

pub use dto::{RoomCreate, RoomUpdate};

fn room_not_found(id: i64) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("ROOM_NOT_FOUND:{id}"))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find_by_id(room_id).one(conn).await
}

pub async fn find_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find()
        .filter(rooms::Column::Code.eq(code))
        .one(conn)
        .await
}

/// Read the room row with `FOR UPDATE`.
///
/// Postgres holds the row lock until the transaction ends. SQLite has no
/// row locks; its single writer serializes the transaction instead.
pub async fn lock_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<rooms::Model, sea_orm::DbErr> {
    rooms::Entity::find_by_id(room_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| room_not_found(room_id))
}

pub async fn create_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomCreate,
) -> Result<rooms::Model, sea_orm::DbErr> {
    let room = rooms::ActiveModel {
        id: NotSet,
        code: Set(dto.code),
        status: Set(rooms::RoomStatus::Waiting),
        first_picker_id: Set(None),
        total_turns: Set(dto.total_turns),
        created_at: Set(dto.created_at),
        updated_at: Set(dto.created_at),
        expires_at: Set(dto.expires_at),
        lock_version: Set(1),
    };
    room.insert(conn).await
}

/// Apply `dto` only if the stored version still matches, then refetch.
pub async fn update_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoomUpdate,
) -> Result<rooms::Model, sea_orm::DbErr> {
    let mut update = rooms::Entity::update_many()
        .col_expr(rooms::Column::UpdatedAt, Expr::value(dto.updated_at))
        .col_expr(
            rooms::Column::LockVersion,
            Expr::col(rooms::Column::LockVersion).add(1),
        );
    if let Some(status) = dto.status {
        update = update.col_expr(rooms::Column::Status, Expr::value(status));
    }
    if let Some(first) = dto.first_picker_id {
        update = update.col_expr(rooms::Column::FirstPickerId, Expr::value(Some(first)));
    }

    let result = update
        .filter(rooms::Column::Id.eq(dto.id))
        .filter(rooms::Column::LockVersion.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, dto.id).await? {
            Some(room) => Err(sea_orm::DbErr::Custom(format!(
                "OPTIMISTIC_LOCK:{{\"expected\":{},\"actual\":{}}}",
                dto.expected_version, room.lock_version
            ))),
            None => Err(room_not_found(dto.id)),
        };
    }

    find_by_id(conn, dto.id)
        .await?
        .ok_or_else(|| room_not_found(dto.id))
}
