use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::db::require_db;
use crate::domain::names::normalize_room_code;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::rooms::{self, Room};
use crate::state::app_state::AppState;

/// Room addressed by the `{code}` path segment. Codes are case-insensitive.
#[derive(Debug, Clone)]
pub struct CurrentRoom(pub Room);

impl CurrentRoom {
    pub fn into_inner(self) -> Room {
        self.0
    }
}

pub(crate) fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::internal("AppState not available"))
}

impl FromRequest for CurrentRoom {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let raw = req.match_info().get("code").ok_or_else(|| {
                AppError::bad_request(ErrorCode::InvalidPathParam, "Missing room code")
            })?;
            let code = normalize_room_code(raw)?;

            let state = app_state(&req)?;
            let db = require_db(&state)?;
            let room = rooms::require_by_code(db, &code).await?;
            Ok(CurrentRoom(room))
        })
    }
}
