//! Full-text search helpers.
//!
//! # Responsibility
//! - Turn free user text into a safe FTS5 `MATCH` expression.
//! - Classify FTS5 syntax failures so they surface as validation errors.
//!
//! Query execution itself lives in `query::note_query`, which joins the
//! `notes_fts` index into the shared note query.

pub mod fts;
