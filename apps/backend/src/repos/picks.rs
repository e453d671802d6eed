//! Pick ledger repository functions.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::picks_sea as picks_adapter;
use crate::domain::ledger::{LedgerPick, PickLedger};
use crate::entities::picks;
use crate::errors::domain::DomainError;

impl From<picks::Model> for LedgerPick {
    fn from(m: picks::Model) -> Self {
        Self {
            id: m.id,
            season_game_id: m.season_game_id,
            participant_id: m.participant_id,
            pick_number: m.pick_number,
            picked_at: m.picked_at,
            undo_deadline: m.undo_deadline,
            undone_at: m.undone_at,
        }
    }
}

/// Load the room's full ledger.
pub async fn load_ledger<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
) -> Result<PickLedger, DomainError> {
    let rows = picks_adapter::find_by_room(conn, room_id).await?;
    Ok(PickLedger::new(rows.into_iter().map(LedgerPick::from).collect()))
}

pub async fn append<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: picks_adapter::PickCreate,
) -> Result<LedgerPick, DomainError> {
    let row = picks_adapter::create_pick(conn, dto).await?;
    Ok(LedgerPick::from(row))
}

pub async fn mark_undone<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    pick_id: i64,
    at: OffsetDateTime,
) -> Result<(), DomainError> {
    picks_adapter::mark_undone(conn, pick_id, at).await?;
    Ok(())
}
