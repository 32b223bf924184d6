//! SQLite storage bootstrap, schema migrations and request scopes.
//!
//! # Responsibility
//! - Open and configure SQLite connections for notekeep core.
//! - Apply schema migrations in deterministic order.
//! - Provide the per-request unit of work ([`RequestScope`]).
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Every write runs inside exactly one transaction owned by a `RequestScope`.

use thiserror::Error;

pub mod migrations;
mod open;
mod scope;

pub use open::{open_db, open_db_in_memory};
pub use scope::RequestScope;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
