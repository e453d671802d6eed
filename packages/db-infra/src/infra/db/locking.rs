use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::DbInfraError;

/// Stable 64-bit advisory lock id for a textual key.
pub fn pg_lock_id(key: &str) -> i64 {
    xxh3_64(key.as_bytes()) as i64
}

/// Session-level Postgres advisory lock serializing migrations across
/// backend instances that boot at the same time.
///
/// The pool handed in must have exactly one connection so lock and unlock
/// run on the same session.
pub struct PgAdvisoryLock {
    pool: DatabaseConnection,
    lock_id: i64,
    held: bool,
}

impl PgAdvisoryLock {
    pub fn new(pool: DatabaseConnection, key: &str) -> Self {
        Self {
            pool,
            lock_id: pg_lock_id(key),
            held: false,
        }
    }

    /// Non-blocking attempt. Returns `true` when the lock is now held.
    pub async fn try_acquire(&mut self) -> Result<bool, DbInfraError> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT pg_try_advisory_lock($1) AS locked",
            vec![self.lock_id.into()],
        );
        let row = self
            .pool
            .query_one(stmt)
            .await
            .map_err(|e| DbInfraError::Migration {
                message: format!("advisory lock query failed: {e}"),
            })?;

        let locked = match row {
            Some(row) => row
                .try_get::<bool>("", "locked")
                .map_err(|e| DbInfraError::Migration {
                    message: format!("failed to read advisory lock result: {e}"),
                })?,
            None => false,
        };

        self.held = locked;
        debug!(lock_id = self.lock_id, locked, "advisory lock attempt");
        Ok(locked)
    }

    pub async fn release(mut self) -> Result<(), DbInfraError> {
        if !self.held {
            return Ok(());
        }
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT pg_advisory_unlock($1) AS unlocked",
            vec![self.lock_id.into()],
        );
        let row = self
            .pool
            .query_one(stmt)
            .await
            .map_err(|e| DbInfraError::Migration {
                message: format!("advisory unlock query failed: {e}"),
            })?;
        let unlocked = row
            .and_then(|row| row.try_get::<bool>("", "unlocked").ok())
            .unwrap_or(false);
        if !unlocked {
            warn!(lock_id = self.lock_id, "advisory unlock returned false");
        }
        self.held = false;
        Ok(())
    }
}
