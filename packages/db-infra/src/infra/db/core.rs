use std::future::Future;
use std::time::{Duration, Instant};

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use rand::Rng;
use sea_orm::sqlx::sqlite::SqliteJournalMode;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::db::{
    make_conn_spec, pool_settings, validate_db_config, DbKind, DbOwner, PoolPurpose, RuntimeEnv,
};
use crate::error::DbInfraError;
use crate::infra::db::locking::PgAdvisoryLock;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 500;
const LOCK_TIMEOUT_MS: u64 = 30_000;
const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempts = attempt, "database connection established after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, interval_ms, error = %e, "database connection failed, retrying");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Open a pool for the given environment, engine, role and purpose.
///
/// Postgres connections are retried a few times so the backend can start
/// alongside its database container.
pub async fn build_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
    purpose: PoolPurpose,
) -> Result<DatabaseConnection, DbInfraError> {
    validate_db_config(env, db_kind)?;
    let url = make_conn_spec(env, db_kind, owner)?;
    let settings = pool_settings(db_kind, purpose);

    let mut opt = ConnectOptions::new(url);
    opt.min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);
    if db_kind == DbKind::SqliteFile {
        // applied by sqlx on every new connection, not once per pool
        opt.map_sqlx_sqlite_opts(|o| {
            o.journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS))
        });
    }

    let connect = || {
        let opt = opt.clone();
        async move {
            Database::connect(opt)
                .await
                .map_err(|e| DbInfraError::Connect {
                    message: format!("failed to connect to {db_kind}: {e}"),
                })
        }
    };

    let pool = if db_kind == DbKind::Postgres {
        retry_connection(connect, CONNECT_ATTEMPTS, CONNECT_INTERVAL_MS).await?
    } else {
        connect().await?
    };

    Ok(pool)
}

/// Open an owner pool and run `command` against it.
pub async fn orchestrate_migration(
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let pool = build_pool(env, db_kind, DbOwner::Owner, PoolPurpose::Migration).await?;
    orchestrate_migration_internal(&pool, env, db_kind, command).await
}

/// Run `command` on an existing pool, holding the migration lock for Postgres.
pub async fn orchestrate_migration_internal(
    pool: &DatabaseConnection,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    info!(env = ?env, db_kind = %db_kind, command = ?command, "migrate=start");

    if command == MigrationCommand::Up && schema_is_current(pool).await? {
        info!("migrate=skipped up_to_date=true");
        return Ok(());
    }

    match db_kind {
        DbKind::Postgres => {
            let key = format!("draft:migrate:{env:?}");
            let mut lock = PgAdvisoryLock::new(pool.clone(), &key);
            acquire_with_backoff(&mut lock).await?;

            let result = run_command(pool, command).await;
            if let Err(e) = lock.release().await {
                warn!(error = %e, "failed to release migration lock");
            }
            result?;
        }
        DbKind::SqliteFile | DbKind::SqliteMemory => run_command(pool, command).await?,
    }

    verify_applied(pool, command).await?;
    info!("migrate=done");
    Ok(())
}

async fn acquire_with_backoff(lock: &mut PgAdvisoryLock) -> Result<(), DbInfraError> {
    let start = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        if lock.try_acquire().await? {
            return Ok(());
        }
        if start.elapsed() >= Duration::from_millis(LOCK_TIMEOUT_MS) {
            return Err(DbInfraError::Migration {
                message: format!(
                    "migration lock acquisition timed out after {:?} ({attempts} attempts)",
                    start.elapsed()
                ),
            });
        }
        let base_ms = (5u64 << attempts.min(5)).min(160);
        let jitter_ms = rand::rng().random_range(0..4);
        tokio::time::sleep(Duration::from_millis(base_ms + jitter_ms)).await;
    }
}

async fn run_command(
    pool: &DatabaseConnection,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    migrate(pool, command)
        .await
        .map_err(|e| DbInfraError::Migration {
            message: format!("migration execution failed: {e}"),
        })
}

async fn schema_is_current(pool: &DatabaseConnection) -> Result<bool, DbInfraError> {
    let expected = Migrator::migrations().len();
    match Migrator::get_applied_migrations(pool).await {
        Ok(applied) => Ok(applied.len() == expected),
        Err(DbErr::Exec(_)) => Ok(false),
        Err(e) => Err(DbInfraError::Migration {
            message: format!("failed to read applied migrations: {e}"),
        }),
    }
}

async fn verify_applied(
    pool: &DatabaseConnection,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let expected = match command {
        MigrationCommand::Up | MigrationCommand::Fresh | MigrationCommand::Refresh => {
            Migrator::migrations().len()
        }
        MigrationCommand::Reset => 0,
        MigrationCommand::Down | MigrationCommand::Status => return Ok(()),
    };
    let applied = migration::count_applied_migrations(pool)
        .await
        .map_err(|e| DbInfraError::Migration {
            message: format!("failed to count applied migrations: {e}"),
        })?;
    if applied != expected {
        return Err(DbInfraError::Migration {
            message: format!(
                "expected {expected} applied migrations after {command:?}, found {applied}"
            ),
        });
    }
    Ok(())
}
