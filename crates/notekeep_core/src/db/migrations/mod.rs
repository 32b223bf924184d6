//! Schema migrations for the notekeep store.
//!
//! # Responsibility
//! - Hold the ordered list of schema steps (users, notes/tags, favorites,
//!   full-text index).
//! - Bring a connection up to the latest schema in one transaction.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per step.
//! - `PRAGMA user_version` always equals the last applied step.
//! - A store newer than this binary is never touched.
//!
//! # See also
//! - `0004_notes_fts.sql` for the FTS5 index queried by `search::fts`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users",
        sql: include_str!("0001_users.sql"),
    },
    Migration {
        version: 2,
        name: "notes_tags",
        sql: include_str!("0002_notes_tags.sql"),
    },
    Migration {
        version: 3,
        name: "favorites",
        sql: include_str!("0003_favorites.sql"),
    },
    Migration {
        version: 4,
        name: "notes_fts",
        sql: include_str!("0004_notes_fts.sql"),
    },
];

/// Schema version this binary migrates up to.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

fn pending_after(version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > version)
}

/// Migrates `conn` to [`latest_version`]. Returns the number of steps applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from_version = stored_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let tx = conn.transaction()?;
    let mut applied = 0;
    for migration in pending_after(from_version) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            migration.version, migration.name
        );
        applied += 1;
    }
    tx.commit()?;

    if applied > 0 {
        info!(
            "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} applied={applied}"
        );
    }
    Ok(applied)
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
