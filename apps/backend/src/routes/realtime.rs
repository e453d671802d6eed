use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::debug;

use crate::extractors::RoomParticipant;
use crate::state::app_state::AppState;
use crate::ws::session::WsSession;

/// Upgrade to a websocket bound to the caller's room and seat.
///
/// Browsers cannot set headers on the upgrade, so the session token usually
/// arrives as `?token=`.
async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    seated: RoomParticipant,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let RoomParticipant { room, participant } = seated;
    debug!(room_id = room.id, participant_id = participant.id, "websocket upgrade");

    let session = WsSession::new(app_state, room.id, participant.id);
    ws::start(session, &req, stream)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{code}/ws", web::get().to(upgrade));
}
