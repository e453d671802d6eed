//! In-process fanout: room id -> live websocket sessions.

use actix::prelude::*;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::events::DraftEvent;

#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct RoomEvent(pub DraftEvent);

#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<i64, DashMap<Uuid, Recipient<RoomEvent>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn register(&self, room_id: i64, conn_id: Uuid, recipient: Recipient<RoomEvent>) {
        self.rooms
            .entry(room_id)
            .or_default()
            .insert(conn_id, recipient);
    }

    pub fn unregister(&self, room_id: i64, conn_id: Uuid) {
        let now_empty = match self.rooms.get(&room_id) {
            Some(sessions) => {
                sessions.remove(&conn_id);
                sessions.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.rooms.remove_if(&room_id, |_, sessions| sessions.is_empty());
        }
    }

    /// Deliver to every session of the event's room; returns how many got it.
    pub fn broadcast(&self, event: &DraftEvent) -> usize {
        let Some(sessions) = self.rooms.get(&event.room_id) else {
            return 0;
        };
        let mut delivered = 0;
        for entry in sessions.iter() {
            if entry.value().try_send(RoomEvent(event.clone())).is_ok() {
                delivered += 1;
            } else {
                debug!(room_id = event.room_id, conn_id = %entry.key(), "session mailbox unavailable");
            }
        }
        delivered
    }

    pub fn session_count(&self, room_id: i64) -> usize {
        self.rooms.get(&room_id).map(|s| s.len()).unwrap_or(0)
    }
}
