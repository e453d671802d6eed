use db_infra::config::db::{DbKind, DbOwner, PoolPurpose, RuntimeEnv};
use db_infra::{build_pool, orchestrate_migration, orchestrate_migration_internal};
use migration::MigrationCommand;
use tracing::info;

use crate::config::DraftSettings;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::ws::broker::RealtimeBroker;

/// Builder for `AppState`, shared by `main` and the test suites.
pub struct StateBuilder {
    env: RuntimeEnv,
    db_kind: Option<DbKind>,
    settings: DraftSettings,
    redis_url: Option<String>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Test,
            db_kind: None,
            settings: DraftSettings::default(),
            redis_url: None,
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_db(mut self, db_kind: DbKind) -> Self {
        self.db_kind = Some(db_kind);
        self
    }

    pub fn with_settings(mut self, settings: DraftSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_redis(mut self, redis_url: Option<String>) -> Self {
        self.redis_url = redis_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Open the runtime pool, bring the schema up to date and wire realtime.
    ///
    /// Postgres migrates through a separate owner pool; SQLite migrates on
    /// the runtime pool because an in-memory database exists only there.
    pub async fn build(self) -> Result<AppState, AppError> {
        let mut state = match self.db_kind {
            Some(kind) => {
                let pool = build_pool(self.env, kind, DbOwner::App, PoolPurpose::Runtime).await?;
                match kind {
                    DbKind::Postgres => {
                        orchestrate_migration(self.env, kind, MigrationCommand::Up).await?
                    }
                    DbKind::SqliteFile | DbKind::SqliteMemory => {
                        orchestrate_migration_internal(&pool, self.env, kind, MigrationCommand::Up)
                            .await?
                    }
                }
                info!(db_kind = %kind, env = ?self.env, "database ready");
                AppState::new(pool, self.settings)
            }
            None => AppState::without_db(self.settings),
        };

        if let Some(url) = self.redis_url {
            let broker = RealtimeBroker::connect(&url).await?;
            state = state.with_broker(broker);
            info!("realtime fanout via redis");
        }

        Ok(state)
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_without_db() {
        let state = build_state().build().await.unwrap();
        assert!(state.db().is_none());
        assert!(state.broker().is_none());
    }

    #[tokio::test]
    async fn builds_migrated_memory_db() {
        let state = build_state()
            .with_db(DbKind::SqliteMemory)
            .build()
            .await
            .unwrap();
        let db = state.db().unwrap();
        let version = migration::get_latest_migration_version(db).await.unwrap();
        assert_eq!(version.as_deref(), Some("m20261019_000001_draft_schema"));
    }
}
