pub mod core;
pub mod locking;

pub use core::{build_pool, orchestrate_migration, orchestrate_migration_internal};
pub use locking::PgAdvisoryLock;
