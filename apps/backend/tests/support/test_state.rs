use std::env;
use std::str::FromStr;

use db_infra::config::db::{DbKind, RuntimeEnv};
use draft_backend::infra::state::{build_state, StateBuilder};
use draft_backend::{AppError, AppState, DraftSettings};

/// `DRAFT_TEST_DB_KIND`, defaulting to a fresh in-memory SQLite database.
pub fn resolve_test_db_kind() -> Result<DbKind, AppError> {
    match env::var("DRAFT_TEST_DB_KIND") {
        Ok(raw) if !raw.trim().is_empty() => Ok(DbKind::from_str(raw.trim())?),
        _ => Ok(DbKind::SqliteMemory),
    }
}

pub fn test_state_builder() -> Result<StateBuilder, AppError> {
    Ok(build_state()
        .with_env(RuntimeEnv::Test)
        .with_db(resolve_test_db_kind()?))
}

pub async fn build_test_state() -> Result<AppState, AppError> {
    test_state_builder()?.build().await
}

pub async fn build_test_state_with(settings: DraftSettings) -> Result<AppState, AppError> {
    test_state_builder()?.with_settings(settings).build().await
}
