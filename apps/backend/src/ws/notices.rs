//! Per-participant notices derived from a draft event.

use crate::domain::events::{DraftEvent, DraftEventKind};
use crate::domain::snapshot::RoomSnapshot;
use crate::ws::protocol::{NoticeKind, ServerMsg};

fn name_of(snapshot: &RoomSnapshot, participant_id: i64) -> &str {
    snapshot
        .participants
        .iter()
        .find(|p| p.id == participant_id)
        .map(|p| p.display_name.as_str())
        .unwrap_or("Your opponent")
}

fn opponent_of(snapshot: &RoomSnapshot, season_game_id: i64) -> &str {
    snapshot
        .games
        .iter()
        .find(|g| g.id == season_game_id)
        .map(|g| g.opponent.as_str())
        .unwrap_or("a game")
}

/// Messages `viewer` should get, besides the event and snapshot themselves.
pub fn notices_for(event: &DraftEvent, viewer: i64, snapshot: &RoomSnapshot) -> Vec<ServerMsg> {
    let mut out = Vec::new();
    let by_other = event.actor().is_some_and(|actor| actor != viewer);

    match &event.kind {
        DraftEventKind::PickAdded {
            participant_id,
            season_game_id,
            ..
        } if by_other => out.push(ServerMsg::Notice {
            kind: NoticeKind::OpponentPick,
            message: format!(
                "{} picked {}",
                name_of(snapshot, *participant_id),
                opponent_of(snapshot, *season_game_id)
            ),
        }),
        DraftEventKind::ParticipantJoined { display_name, .. } if by_other => {
            out.push(ServerMsg::Notice {
                kind: NoticeKind::PlayerJoined,
                message: format!("{display_name} joined the room"),
            })
        }
        _ => {}
    }

    let turn_passed = event.next_picker() == Some(viewer)
        && snapshot.turn.picker() == Some(viewer)
        && event.actor() != Some(viewer);
    if turn_passed {
        out.push(ServerMsg::YourTurn {
            room_id: event.room_id,
            version: event.version,
        });
        out.push(ServerMsg::Notice {
            kind: NoticeKind::YourTurn,
            message: "It's your turn to pick".to_string(),
        });
    }

    out
}
