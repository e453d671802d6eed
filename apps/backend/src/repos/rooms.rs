//! Room repository functions for the service layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::rooms_sea as rooms_adapter;
use crate::domain::lifecycle::RoomStatus;
use crate::domain::snapshot::RoomHeader;
use crate::entities::rooms;
use crate::errors::domain::{DomainError, NotFoundKind};

/// Room as the services see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: i64,
    pub code: String,
    pub status: RoomStatus,
    pub first_picker_id: Option<i64>,
    pub total_turns: i16,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub lock_version: i32,
}

impl From<rooms::Model> for Room {
    fn from(m: rooms::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            status: m.status,
            first_picker_id: m.first_picker_id,
            total_turns: m.total_turns,
            created_at: m.created_at,
            updated_at: m.updated_at,
            expires_at: m.expires_at,
            lock_version: m.lock_version,
        }
    }
}

impl From<&Room> for RoomHeader {
    fn from(r: &Room) -> Self {
        Self {
            id: r.id,
            code: r.code.clone(),
            status: r.status,
            first_picker_id: r.first_picker_id,
            total_turns: r.total_turns,
            created_at: r.created_at,
            expires_at: r.expires_at,
            version: r.lock_version,
        }
    }
}

pub async fn find_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Option<Room>, DomainError> {
    let room = rooms_adapter::find_by_code(conn, code).await?;
    Ok(room.map(Room::from))
}

/// Room by code or `NotFound(Room)`.
pub async fn require_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Room, DomainError> {
    find_by_code(conn, code).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Room, format!("Room {code} not found"))
    })
}

pub async fn require_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Room, DomainError> {
    rooms_adapter::find_by_id(conn, room_id)
        .await?
        .map(Room::from)
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Room, format!("Room {room_id} not found")))
}

/// Lock the room row for the rest of the transaction and return it.
pub async fn lock<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Room, DomainError> {
    let room = rooms_adapter::lock_by_id(conn, room_id).await?;
    Ok(Room::from(room))
}

pub async fn create_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: rooms_adapter::RoomCreate,
) -> Result<Room, DomainError> {
    let room = rooms_adapter::create_room(conn, dto).await?;
    Ok(Room::from(room))
}

/// Compare-and-swap update; bumps `lock_version` exactly once.
///
/// `status`, when given, must be a legal forward transition from the
/// status the caller read.
pub async fn update_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room: &Room,
    status: Option<RoomStatus>,
    first_picker_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<Room, DomainError> {
    let mut dto = rooms_adapter::RoomUpdate::new(room.id, room.lock_version, now);
    if let Some(next) = status.filter(|s| *s != room.status) {
        if !room.status.can_transition_to(next) {
            return Err(DomainError::validation_other(format!(
                "Illegal room transition {} -> {next}",
                room.status
            )));
        }
        dto = dto.with_status(next);
    }
    if let Some(first) = first_picker_id {
        dto = dto.with_first_picker(first);
    }
    let updated = rooms_adapter::update_room(conn, dto).await?;
    Ok(Room::from(updated))
}
