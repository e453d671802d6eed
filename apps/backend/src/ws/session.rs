use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::web;
use actix_web_actors::ws;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::txn::with_read_txn;
use crate::domain::events::DraftEvent;
use crate::domain::outcome::{DraftRejection, Outcome};
use crate::domain::snapshot::RoomSnapshot;
use crate::error::AppError;
use crate::services::snapshot::load_snapshot;
use crate::state::app_state::AppState;
use crate::ws::hub::{RoomEvent, RoomRegistry};
use crate::ws::notices::notices_for;
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

async fn fetch_snapshot(
    app_state: web::Data<AppState>,
    room_id: i64,
) -> Result<Outcome<RoomSnapshot>, AppError> {
    let now = OffsetDateTime::now_utc();
    with_read_txn(&app_state, |txn| {
        Box::pin(async move { Ok(load_snapshot(txn, room_id, now).await?) })
    })
    .await
}

/// One participant's websocket, subscribed to a single room.
pub struct WsSession {
    conn_id: Uuid,
    room_id: i64,
    participant_id: i64,
    app_state: web::Data<AppState>,
    registry: Arc<RoomRegistry>,
    last_heartbeat: Instant,
}

impl WsSession {
    pub fn new(app_state: web::Data<AppState>, room_id: i64, participant_id: i64) -> Self {
        let registry = app_state.registry();
        Self {
            conn_id: Uuid::new_v4(),
            room_id,
            participant_id,
            app_state,
            registry,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    conn_id = %actor.conn_id,
                    room_id = actor.room_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    /// Re-read the room and send the snapshot, plus notices for `event`.
    fn push_snapshot(&self, ctx: &mut ws::WebsocketContext<Self>, event: Option<DraftEvent>) {
        let app_state = self.app_state.clone();
        let room_id = self.room_id;

        ctx.spawn(
            fetch_snapshot(app_state, room_id)
                .into_actor(self)
                .map(move |res, actor, ctx| match res {
                    Ok(Outcome::Accepted(snapshot)) => {
                        let version = snapshot.room.version;
                        let extra = event
                            .as_ref()
                            .map(|e| notices_for(e, actor.participant_id, &snapshot))
                            .unwrap_or_default();
                        Self::send_json(ctx, &ServerMsg::Snapshot { version, snapshot });
                        for msg in &extra {
                            Self::send_json(ctx, msg);
                        }
                    }
                    Ok(Outcome::Rejected(rejection)) => {
                        let message = rejection.detail();
                        let code = match rejection {
                            DraftRejection::RoomExpired => ErrorCode::RoomExpired,
                            _ => ErrorCode::BadRequest,
                        };
                        Self::send_error_and_close(ctx, code, message);
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            conn_id = %actor.conn_id,
                            room_id = actor.room_id,
                            "[WS SESSION] snapshot load failed"
                        );
                        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                        ctx.stop();
                    }
                }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(
            conn_id = %self.conn_id,
            room_id = self.room_id,
            participant_id = self.participant_id,
            "[WS SESSION] started"
        );
        self.registry
            .register(self.room_id, self.conn_id, ctx.address().recipient::<RoomEvent>());
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry.unregister(self.room_id, self.conn_id);
        info!(
            conn_id = %self.conn_id,
            room_id = self.room_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let Ok(cmd) = serde_json::from_str::<ClientMsg>(&text) else {
                    Self::send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                match cmd {
                    ClientMsg::Hello { protocol } => {
                        if protocol != PROTOCOL_VERSION {
                            Self::send_error_and_close(
                                ctx,
                                ErrorCode::BadProtocol,
                                "Unsupported protocol version",
                            );
                            return;
                        }
                        Self::send_json(
                            ctx,
                            &ServerMsg::HelloAck {
                                protocol: PROTOCOL_VERSION,
                                room_id: self.room_id,
                                participant_id: self.participant_id,
                            },
                        );
                        self.push_snapshot(ctx, None);
                    }
                    ClientMsg::Resync => self.push_snapshot(ctx, None),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    room_id = self.room_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<RoomEvent> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: RoomEvent, ctx: &mut Self::Context) -> Self::Result {
        let RoomEvent(event) = msg;
        Self::send_json(ctx, &ServerMsg::Event { event: event.clone() });
        self.push_snapshot(ctx, Some(event));
    }
}
