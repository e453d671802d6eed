//! Participant repository functions.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::participants_sea as participants_adapter;
use crate::domain::snapshot::ParticipantPublic;
use crate::entities::participants;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: i64,
    pub room_id: i64,
    pub display_name: String,
    pub seat: i16,
    pub joined_at: OffsetDateTime,
}

impl From<participants::Model> for Participant {
    fn from(m: participants::Model) -> Self {
        Self {
            id: m.id,
            room_id: m.room_id,
            display_name: m.display_name,
            seat: m.seat,
            joined_at: m.joined_at,
        }
    }
}

impl From<&Participant> for ParticipantPublic {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name.clone(),
            seat: p.seat,
        }
    }
}

pub async fn find_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<Vec<Participant>, DomainError> {
    let rows = participants_adapter::find_by_room(conn, room_id).await?;
    Ok(rows.into_iter().map(Participant::from).collect())
}

pub async fn count_by_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<usize, DomainError> {
    let count = participants_adapter::count_by_room(conn, room_id).await?;
    Ok(usize::try_from(count).unwrap_or(usize::MAX))
}

pub async fn find_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    session_hash: &str,
) -> Result<Option<Participant>, DomainError> {
    let row = participants_adapter::find_by_session(conn, room_id, session_hash).await?;
    Ok(row.map(Participant::from))
}

pub async fn create_participant<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: participants_adapter::ParticipantCreate,
) -> Result<Participant, DomainError> {
    let row = participants_adapter::create_participant(conn, dto).await?;
    Ok(Participant::from(row))
}
