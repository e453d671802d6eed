//! Room and draft endpoints under `/api/rooms`.
//!
//! Writes run inside [`with_txn`]; realtime events are published only after
//! the transaction has committed, one per write. Reads run inside
//! [`with_read_txn`] so the ETag and body come from the same room version.

use actix_web::http::header::{self, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::require_db;
use crate::db::txn::{with_read_txn, with_txn};
use crate::domain::events::{DraftEvent, DraftEventKind};
use crate::domain::snapshot::{ParticipantPublic, PickPublic, RoomHeader};
use crate::domain::turn::Turn;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentRoom, RoomParticipant, SessionToken, ValidatedJson};
use crate::http::etag::{if_none_match_hits, room_etag};
use crate::services::draft::DraftService;
use crate::services::notify;
use crate::services::rooms::{participant_for_token, Coin, RoomService, Seated};
use crate::services::snapshot::{calendar_for, current_turn, load_snapshot};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PickBody {
    #[serde(alias = "season_game_id")]
    season_game_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatedResponse {
    room: RoomHeader,
    participant: ParticipantPublic,
    session_token: String,
}

impl From<Seated> for SeatedResponse {
    fn from(seated: Seated) -> Self {
        Self {
            room: RoomHeader::from(&seated.room),
            participant: ParticipantPublic::from(&seated.participant),
            session_token: seated.session_token,
        }
    }
}

/// Body for accepted picks and undos.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PickResponse {
    pick: PickPublic,
    version: i32,
    turn: Turn,
}


/// POST /api/rooms
async fn create_room(
    body: ValidatedJson<NameBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = RoomService::new(&app_state.settings);
    let NameBody { name } = body.into_inner();
    let now = OffsetDateTime::now_utc();

    let seated = with_txn(&app_state, |txn| {
        Box::pin(async move { service.create_room(txn, &name, now).await })
    })
    .await?;

    Ok(HttpResponse::Created().json(SeatedResponse::from(seated)))
}

/// POST /api/rooms/{code}/join
async fn join_room(
    current: CurrentRoom,
    body: ValidatedJson<NameBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = RoomService::new(&app_state.settings);
    let room_id = current.0.id;
    let NameBody { name } = body.into_inner();
    let now = OffsetDateTime::now_utc();

    let seated = with_txn(&app_state, |txn| {
        Box::pin(async move { service.join_room(txn, room_id, &name, now).await })
    })
    .await?
    .into_result()?;

    notify::publish(
        &app_state,
        DraftEvent::new(
            room_id,
            seated.room.lock_version,
            DraftEventKind::ParticipantJoined {
                participant_id: seated.participant.id,
                display_name: seated.participant.display_name.clone(),
                status: seated.room.status.as_str().to_string(),
            },
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(SeatedResponse::from(seated)))
}

/// GET /api/rooms/{code}
///
/// Honors `If-None-Match` against the room version; 410 once expired.
async fn get_snapshot(
    req: HttpRequest,
    current: CurrentRoom,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = current.into_inner().id;
    let now = OffsetDateTime::now_utc();

    let snapshot = with_read_txn(&app_state, |txn| {
        Box::pin(async move { Ok(load_snapshot(txn, room_id, now).await?) })
    })
    .await?
    .into_result()?;
    let etag = room_etag(&snapshot.room.code, snapshot.room.version);

    let not_modified = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| if_none_match_hits(v, &etag));
    if not_modified {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((header::ETAG, etag))
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .insert_header((header::ETAG, etag))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(snapshot))
}

/// GET /api/rooms/{code}/me
///
/// `null` without a token; a token from another room is a 401.
async fn me(
    current: CurrentRoom,
    token: SessionToken,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(token) = token.0 else {
        return Ok(HttpResponse::Ok().json(Option::<ParticipantPublic>::None));
    };
    let db = require_db(&app_state)?;
    let participant = participant_for_token(db, current.0.id, &token)
        .await?
        .ok_or_else(|| {
            AppError::unauthorized(
                ErrorCode::UnauthorizedInvalidSession,
                "Session token is not valid for this room",
            )
        })?;
    Ok(HttpResponse::Ok().json(Some(ParticipantPublic::from(&participant))))
}

/// GET /api/rooms/{code}/turn
async fn get_turn(
    current: CurrentRoom,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = current.into_inner().id;
    let turn = with_read_txn(&app_state, |txn| {
        Box::pin(async move { Ok(current_turn(txn, room_id).await?) })
    })
    .await?;
    Ok(HttpResponse::Ok().json(turn))
}

/// POST /api/rooms/{code}/coin-toss
async fn coin_toss(
    seated: RoomParticipant,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = RoomService::new(&app_state.settings);
    let room_id = seated.room.id;
    let coin = Coin::toss();
    let now = OffsetDateTime::now_utc();

    let room = with_txn(&app_state, |txn| {
        Box::pin(async move { service.assign_first_picker(txn, room_id, coin, now).await })
    })
    .await?
    .into_result()?;

    notify::publish(
        &app_state,
        DraftEvent::new(
            room_id,
            room.lock_version,
            DraftEventKind::StatusChanged {
                status: room.status.as_str().to_string(),
                first_picker_id: room.first_picker_id,
            },
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(RoomHeader::from(&room)))
}

/// POST /api/rooms/{code}/picks
async fn attempt_pick(
    seated: RoomParticipant,
    body: ValidatedJson<PickBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = DraftService::new(&app_state.settings);
    let room_id = seated.room.id;
    let participant_id = seated.participant.id;
    let season_game_id = body.season_game_id;
    let now = OffsetDateTime::now_utc();

    let accepted = with_txn(&app_state, |txn| {
        Box::pin(async move {
            Ok(service
                .attempt_pick(txn, room_id, participant_id, season_game_id, now)
                .await?)
        })
    })
    .await?
    .into_result()?;

    let version = accepted.room.lock_version;
    notify::publish(
        &app_state,
        DraftEvent::new(
            room_id,
            version,
            DraftEventKind::PickAdded {
                pick_id: accepted.pick.id,
                participant_id,
                season_game_id,
                pick_number: accepted.pick.pick_number,
                next_picker_id: accepted.next_turn.picker(),
                status: accepted.room.status.as_str().to_string(),
            },
        ),
    )
    .await;

    Ok(HttpResponse::Created().json(PickResponse {
        pick: PickPublic::from(&accepted.pick),
        version,
        turn: accepted.next_turn,
    }))
}

/// POST /api/rooms/{code}/picks/{pick_id}/undo
async fn undo_pick(
    seated: RoomParticipant,
    path: web::Path<(String, i64)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let service = DraftService::new(&app_state.settings);
    let room_id = seated.room.id;
    let participant_id = seated.participant.id;
    let (_, pick_id) = path.into_inner();
    let now = OffsetDateTime::now_utc();

    let undone = with_txn(&app_state, |txn| {
        Box::pin(async move {
            Ok(service
                .undo(txn, room_id, participant_id, pick_id, now)
                .await?)
        })
    })
    .await?
    .into_result()?;

    let version = undone.room.lock_version;
    notify::publish(
        &app_state,
        DraftEvent::new(
            room_id,
            version,
            DraftEventKind::PickUndone {
                pick_id,
                participant_id,
                season_game_id: undone.pick.season_game_id,
                next_picker_id: undone.next_turn.picker(),
            },
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(PickResponse {
        pick: PickPublic::from(&undone.pick),
        version,
        turn: undone.next_turn,
    }))
}

/// GET /api/rooms/{code}/calendar.ics
async fn calendar(
    seated: RoomParticipant,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (room_id, participant_id) = (seated.room.id, seated.participant.id);
    let now = OffsetDateTime::now_utc();
    let body = with_read_txn(&app_state, |txn| {
        Box::pin(async move { Ok(calendar_for(txn, room_id, participant_id, now).await?) })
    })
    .await?;

    let disposition = format!(
        "attachment; filename=\"tempo-draft-{}.ics\"",
        seated.room.code.to_ascii_lowercase()
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok(HttpResponse::Ok()
        .content_type("text/calendar; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .body(body))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_room))
        .route("/{code}", web::get().to(get_snapshot))
        .route("/{code}/join", web::post().to(join_room))
        .route("/{code}/me", web::get().to(me))
        .route("/{code}/turn", web::get().to(get_turn))
        .route("/{code}/coin-toss", web::post().to(coin_toss))
        .route("/{code}/picks", web::post().to(attempt_pick))
        .route("/{code}/picks/{pick_id}/undo", web::post().to(undo_pick))
        .route("/{code}/calendar.ics", web::get().to(calendar));
}
