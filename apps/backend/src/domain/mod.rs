//! Domain layer: pure draft logic and read models.

pub mod calendar;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod names;
pub mod outcome;
pub mod season;
pub mod snapshot;
pub mod turn;

#[cfg(test)]
mod tests_lifecycle;

pub use ledger::{LedgerPick, PickLedger};
pub use lifecycle::RoomStatus;
pub use outcome::{DraftRejection, Outcome};
pub use turn::{resolve_turn, Turn, TOTAL_TURNS};
