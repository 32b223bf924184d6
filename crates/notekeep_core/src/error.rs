//! Operation-boundary error taxonomy.
//!
//! # Responsibility
//! - Define the error kinds every public core operation can surface.
//! - Map SQLite failures to semantic kinds (`Conflict`) or a sanitized `Store`.
//!
//! # Invariants
//! - `CoreError::Store` never renders raw store text through `Display`; the
//!   underlying failure stays reachable through `Error::source` for logging.
//! - Unique/primary-key constraint violations surface as `Conflict`, never as
//!   `Store`.

use crate::auth::AuthError;
use crate::db::DbError;
use rusqlite::ffi;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Entity kinds referenced by error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Note,
    Tag,
    Favorite,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Note => "note",
            Self::Tag => "tag",
            Self::Favorite => "favorite",
        };
        f.write_str(name)
    }
}

/// Underlying storage failure kept for diagnostics only.
#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("write attempted outside of a transaction")]
    NoTransaction,
}

/// Error returned by every public core operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input, rejected before touching the store.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Uniqueness violation (username, email, tag name, favorite).
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: i64 },
    /// Entity exists but the caller is not its owner.
    #[error("{entity} {id} is not owned by the caller")]
    Forbidden { entity: Entity, id: i64 },
    /// A referenced id does not resolve to an entity owned by the caller.
    #[error("invalid {entity} reference: {id}")]
    InvalidReference { entity: Entity, id: i64 },
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("storage operation failed")]
    Store(#[source] StoreFailure),
    #[error("summary generation is unavailable")]
    SummaryUnavailable,
}

impl CoreError {
    /// Stable metadata-only code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::InvalidReference { .. } => "invalid_reference",
            Self::Auth(_) => "auth",
            Self::Store(_) => "store",
            Self::SummaryUnavailable => "summary_unavailable",
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    pub(crate) fn invalid_data(message: impl Into<String>) -> Self {
        Self::Store(StoreFailure::InvalidData(message.into()))
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreFailure::Sqlite(value))
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        Self::Store(StoreFailure::Db(value))
    }
}

/// Maps unique/primary-key violations to `Conflict`, anything else to `Store`.
///
/// `conflict_message` receives the raw SQLite constraint message (for example
/// `UNIQUE constraint failed: users.email`) so callers can name the column.
pub(crate) fn conflict_or_store(
    err: rusqlite::Error,
    conflict_message: impl FnOnce(&str) -> String,
) -> CoreError {
    if is_unique_violation(&err) {
        let raw = match &err {
            rusqlite::Error::SqliteFailure(_, Some(message)) => message.as_str(),
            _ => "",
        };
        return CoreError::Conflict(conflict_message(raw));
    }
    CoreError::from(err)
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, _) => {
            code.code == rusqlite::ErrorCode::ConstraintViolation
                && (code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || code.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}
