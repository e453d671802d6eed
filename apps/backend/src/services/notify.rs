//! Post-commit fanout of draft events.
//!
//! Never fails the caller: the write is already committed, and clients
//! can always `resync`.

use tracing::{debug, warn};

use crate::domain::events::DraftEvent;
use crate::state::app_state::AppState;

pub async fn publish(state: &AppState, event: DraftEvent) {
    if let Some(broker) = state.broker() {
        match broker.publish(&event).await {
            Ok(()) => return,
            Err(err) => {
                warn!(
                    room_id = event.room_id,
                    version = event.version,
                    error = %err,
                    "realtime publish failed, delivering to local sessions only"
                );
            }
        }
    }
    let delivered = state.registry().broadcast(&event);
    debug!(room_id = event.room_id, version = event.version, delivered, "draft event delivered locally");
}
