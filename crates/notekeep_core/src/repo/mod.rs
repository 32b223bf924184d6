//! Repository layer: identity, tags, note-tag links, notes and favorites.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite statements from service orchestration.
//!
//! # Invariants
//! - Repositories borrow a connection (usually a `Transaction` handed out by
//!   `db::RequestScope`) and never open transactions themselves.
//! - Write methods refuse to run in autocommit mode.
//! - Inputs are validated before any statement touches the store.

use crate::error::{CoreError, CoreResult, StoreFailure};
use rusqlite::Connection;

pub mod favorite_repo;
pub mod note_repo;
pub mod note_tag_repo;
pub mod tag_repo;
pub mod user_repo;

/// Fails when `conn` is not inside an open transaction.
pub(crate) fn ensure_write_tx(conn: &Connection) -> CoreResult<()> {
    if conn.is_autocommit() {
        return Err(CoreError::Store(StoreFailure::NoTransaction));
    }
    Ok(())
}
