// Domain error and rejection mapping onto HTTP codes, no database involved.
use crate::domain::outcome::DraftRejection;
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_400() {
    let de = DomainError::validation(ValidationKind::InvalidName, "Name is required");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidName);
    assert_eq!(app.status().as_u16(), 400);

    let other = DomainError::validation_other("bad field");
    let app: AppError = other.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_not_found_kinds() {
    let cases = [
        (NotFoundKind::Room, "ROOM_NOT_FOUND"),
        (NotFoundKind::Participant, "PARTICIPANT_NOT_FOUND"),
        (NotFoundKind::SeasonGame, "SEASON_GAME_NOT_FOUND"),
        (NotFoundKind::Pick, "PICK_NOT_FOUND"),
        (NotFoundKind::Other("x".into()), "NOT_FOUND"),
    ];
    for (kind, code) in cases {
        let app: AppError = DomainError::not_found(kind, "missing").into();
        assert_eq!(app.code().as_str(), code);
        assert_eq!(app.status().as_u16(), 404);
    }
}

#[test]
fn unique_backstops_become_rejections() {
    let app: AppError = DomainError::conflict(ConflictKind::ItemClaimed, "dup").into();
    assert!(matches!(app, AppError::Rejected(DraftRejection::ItemAlreadyClaimed)));
    assert_eq!(app.status().as_u16(), 409);

    let app: AppError = DomainError::conflict(ConflictKind::PickNumberTaken, "dup").into();
    assert_eq!(app.code(), ErrorCode::TurnViolation);

    let app: AppError = DomainError::conflict(ConflictKind::SeatTaken, "dup").into();
    assert_eq!(app.code(), ErrorCode::RoomFull);

    let app: AppError = DomainError::conflict(ConflictKind::OptimisticLock, "stale").into();
    assert_eq!(app.code(), ErrorCode::OptimisticLock);
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn rejection_statuses() {
    let gone: AppError = DraftRejection::RoomExpired.into();
    assert_eq!(gone.status().as_u16(), 410);

    let forbidden: AppError = DraftRejection::NotOwner.into();
    assert_eq!(forbidden.status().as_u16(), 403);

    for rejection in [
        DraftRejection::RoomNotDrafting,
        DraftRejection::TurnViolation,
        DraftRejection::ItemAlreadyClaimed,
        DraftRejection::DraftAlreadyComplete,
        DraftRejection::NotLatestPick,
        DraftRejection::WindowExpired,
        DraftRejection::RoomFull,
        DraftRejection::RoomNotInCoinToss,
    ] {
        let app: AppError = rejection.into();
        assert_eq!(app.status().as_u16(), 409, "{rejection:?}");
    }
}

#[test]
fn maps_infra() {
    let t: AppError = DomainError::infra(InfraErrorKind::Timeout, "timeout").into();
    assert_eq!(t.code().as_str(), "DB_TIMEOUT");
    assert_eq!(t.status().as_u16(), 503);

    let down: AppError = DomainError::infra(InfraErrorKind::DbUnavailable, "down").into();
    assert_eq!(down.code().as_str(), "DB_UNAVAILABLE");
    assert_eq!(down.status().as_u16(), 503);

    let corr: AppError = DomainError::infra(InfraErrorKind::DataCorruption, "bad").into();
    assert_eq!(corr.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(corr.status().as_u16(), 500);

    let other: AppError = DomainError::infra(InfraErrorKind::Other("x".into()), "other").into();
    assert_eq!(other.code().as_str(), "DB_ERROR");
    assert_eq!(other.status().as_u16(), 500);
}
