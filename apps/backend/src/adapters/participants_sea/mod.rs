//! SeaORM adapter for participants.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::participants;

pub mod dto;

pub use dto::ParticipantCreate;

/// Participants of a room in seat order.
pub async fn find_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find()
        .filter(participants::Column::RoomId.eq(room_id))
        .order_by_asc(participants::Column::Seat)
        .all(conn)
        .await
}

pub async fn count_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    participants::Entity::find()
        .filter(participants::Column::RoomId.eq(room_id))
        .count(conn)
        .await
}

pub async fn find_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    session_hash: &str,
) -> Result<Option<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find()
        .filter(participants::Column::RoomId.eq(room_id))
        .filter(participants::Column::SessionHash.eq(session_hash))
        .one(conn)
        .await
}

pub async fn create_participant<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ParticipantCreate,
) -> Result<participants::Model, sea_orm::DbErr> {
    let participant = participants::ActiveModel {
        id: NotSet,
        room_id: Set(dto.room_id),
        display_name: Set(dto.display_name),
        seat: Set(dto.seat),
        session_hash: Set(dto.session_hash),
        joined_at: Set(dto.joined_at),
    };
    participant.insert(conn).await
}
