//! Domain model for users, tags, notes and favorites.
//!
//! # Responsibility
//! - Define the records persisted by the stores and the read models returned
//!   to callers (`NoteView`, `TagView`, `UserView`).
//! - Own input validation that must happen before the store is touched.
//!
//! # Invariants
//! - Identifiers are store-assigned integers and never reused.
//! - Timestamps are Unix epoch milliseconds (UTC).

pub mod favorite;
pub mod note;
pub mod tag;
pub mod user;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
