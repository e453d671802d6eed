use serde::{Deserialize, Serialize};

use crate::domain::events::DraftEvent;
use crate::domain::snapshot::RoomSnapshot;

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello { protocol: i32 },
    /// Re-send the current snapshot, e.g. after a missed event
    Resync,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
        room_id: i64,
        participant_id: i64,
    },

    Event {
        event: DraftEvent,
    },

    Snapshot {
        version: i32,
        snapshot: RoomSnapshot,
    },

    YourTurn {
        room_id: i64,
        version: i32,
    },

    Notice {
        kind: NoticeKind,
        message: String,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

/// Toast-style notices shown to one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    OpponentPick,
    YourTurn,
    PlayerJoined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadProtocol,
    BadRequest,
    RoomExpired,
}
