use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use serde::Deserialize;

use super::room_code::{app_state, CurrentRoom};
use crate::db::require_db;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::participants::Participant;
use crate::repos::rooms::Room;
use crate::services::rooms::participant_for_token;

/// Session token from `Authorization: Bearer <token>` or `?token=`.
///
/// Absent when neither is present; a malformed header is a 401.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn token_from_request(req: &HttpRequest) -> Result<Option<String>, AppError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| {
            AppError::unauthorized(ErrorCode::Unauthorized, "Malformed Authorization header")
        })?;
        let mut parts = value.split_whitespace();
        return match (parts.next(), parts.next(), parts.next()) {
            (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(Some(token.to_string())),
            _ => Err(AppError::unauthorized(
                ErrorCode::Unauthorized,
                "Expected Authorization: Bearer <token>",
            )),
        };
    }

    let query = web::Query::<TokenQuery>::from_query(req.query_string())
        .map(|q| q.into_inner().token)
        .unwrap_or(None);
    Ok(query.filter(|t| !t.is_empty()))
}

impl FromRequest for SessionToken {
    type Error = AppError;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        std::future::ready(token_from_request(req).map(SessionToken))
    }
}

/// Room plus the participant the session token is bound to.
#[derive(Debug, Clone)]
pub struct RoomParticipant {
    pub room: Room,
    pub participant: Participant,
}

impl FromRequest for RoomParticipant {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let room_fut = CurrentRoom::from_request(&req, payload);

        Box::pin(async move {
            let Some(token) = token_from_request(&req)? else {
                return Err(AppError::unauthorized(
                    ErrorCode::Unauthorized,
                    "Session token required",
                ));
            };
            let CurrentRoom(room) = room_fut.await?;

            let state = app_state(&req)?;
            let db = require_db(&state)?;
            let participant = participant_for_token(db, room.id, &token)
                .await?
                .ok_or_else(|| {
                    AppError::unauthorized(
                        ErrorCode::UnauthorizedInvalidSession,
                        "Session token is not valid for this room",
                    )
                })?;

            Ok(RoomParticipant { room, participant })
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn bearer_header_wins() {
        let req = TestRequest::default()
            .uri("/x?token=fromquery")
            .insert_header((header::AUTHORIZATION, "Bearer abc"))
            .to_http_request();
        assert_eq!(token_from_request(&req).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn query_token_fallback() {
        let req = TestRequest::default().uri("/x?token=q1").to_http_request();
        assert_eq!(token_from_request(&req).unwrap().as_deref(), Some("q1"));
        let req = TestRequest::default().uri("/x?token=").to_http_request();
        assert_eq!(token_from_request(&req).unwrap(), None);
        let req = TestRequest::default().uri("/x").to_http_request();
        assert_eq!(token_from_request(&req).unwrap(), None);
    }

    #[test]
    fn malformed_header_is_unauthorized() {
        for value in ["Basic abc", "Bearer", "Bearer a b"] {
            let req = TestRequest::default()
                .insert_header((header::AUTHORIZATION, value))
                .to_http_request();
            let err = token_from_request(&req).unwrap_err();
            assert_eq!(err.code(), ErrorCode::Unauthorized, "{value}");
        }
    }
}
