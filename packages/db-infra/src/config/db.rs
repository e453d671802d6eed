use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sea_orm::DatabaseBackend;

use crate::error::DbInfraError;

/// Which environment the process runs in. Selects the database name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Prod,
    Test,
}

/// Storage engine backing the draft tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

/// Database role used for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application role (DML only)
    App,
    /// Schema owner (migrations)
    Owner,
}

/// What a pool is used for; drives pool sizing and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPurpose {
    Runtime,
    Migration,
}

impl FromStr for DbKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DbKind::Postgres),
            "sqlite-file" | "sqlite" => Ok(DbKind::SqliteFile),
            "sqlite-memory" | "memory" => Ok(DbKind::SqliteMemory),
            other => Err(DbInfraError::config(format!(
                "unknown database kind '{other}' (expected postgres | sqlite-file | sqlite-memory)"
            ))),
        }
    }
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DbKind::Postgres => "postgres",
            DbKind::SqliteFile => "sqlite-file",
            DbKind::SqliteMemory => "sqlite-memory",
        };
        f.write_str(s)
    }
}

impl From<DbKind> for DatabaseBackend {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::Postgres => DatabaseBackend::Postgres,
            DbKind::SqliteFile | DbKind::SqliteMemory => DatabaseBackend::Sqlite,
        }
    }
}

/// Pool sizing for a given purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

pub fn pool_settings(db_kind: DbKind, purpose: PoolPurpose) -> PoolSettings {
    match (db_kind, purpose) {
        // Every connection to sqlite::memory: is a separate database.
        (DbKind::SqliteMemory, _) => PoolSettings {
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        },
        (_, PoolPurpose::Migration) => PoolSettings {
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        },
        // A deferred SQLite transaction that upgrades to a write lock fails
        // with SQLITE_BUSY instead of waiting, so the file pool has one writer.
        (DbKind::SqliteFile, PoolPurpose::Runtime) => PoolSettings {
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        },
        (DbKind::Postgres, PoolPurpose::Runtime) => PoolSettings {
            min_connections: 2,
            max_connections: 16,
            acquire_timeout: Duration::from_secs(5),
        },
    }
}

/// Build the connection string for the given environment, engine and role.
pub fn make_conn_spec(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<String, DbInfraError> {
    match db_kind {
        DbKind::Postgres => postgres_url(env, owner),
        DbKind::SqliteFile => {
            let path = sqlite_file_path(env)?;
            Ok(format!("sqlite://{}?mode=rwc", path.display()))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

/// Reject configurations that could point tests at a production database.
pub fn validate_db_config(env: RuntimeEnv, db_kind: DbKind) -> Result<(), DbInfraError> {
    if db_kind == DbKind::SqliteMemory && env == RuntimeEnv::Prod {
        return Err(DbInfraError::config(
            "sqlite-memory loses all data on restart and is not allowed in prod",
        ));
    }
    if db_kind == DbKind::Postgres {
        db_name(env)?;
    }
    Ok(())
}

fn postgres_url(env: RuntimeEnv, owner: DbOwner) -> Result<String, DbInfraError> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = db_name(env)?;
    let (username, password) = credentials(owner)?;

    let username = utf8_percent_encode(&username, NON_ALPHANUMERIC);
    let password = utf8_percent_encode(&password, NON_ALPHANUMERIC);

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

fn db_name(env: RuntimeEnv) -> Result<String, DbInfraError> {
    match env {
        RuntimeEnv::Prod => must_var("PROD_DB"),
        RuntimeEnv::Test => {
            let name = must_var("TEST_DB")?;
            if !name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test environment requires database name to end with '_test', but got: '{name}'"
                )));
            }
            Ok(name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbInfraError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((
            must_var("DRAFT_OWNER_USER")?,
            must_var("DRAFT_OWNER_PASSWORD")?,
        )),
    }
}

/// Location of the SQLite database file for an environment.
pub fn sqlite_file_path(env: RuntimeEnv) -> Result<PathBuf, DbInfraError> {
    let dir = env::var("DRAFT_SQLITE_DIR").unwrap_or_else(|_| "./data".to_string());
    if dir.trim().is_empty() {
        return Err(DbInfraError::config("DRAFT_SQLITE_DIR must not be empty"));
    }
    let file = match env {
        RuntimeEnv::Prod => "draft.db",
        RuntimeEnv::Test => "draft_test.db",
    };
    Ok(PathBuf::from(dir).join(file))
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
