//! Query composition for note reads.
//!
//! # Responsibility
//! - Compose ownership, tag-set, full-text and favorite filters into one
//!   parameterized statement per page.
//! - Normalize rows into `NoteView` records with batched tag loading.
//!
//! # Invariants
//! - Every note read path (get, list, tag filter, search, favorites) goes
//!   through [`note_query::NoteQuery`].
//! - A page costs a fixed number of statements regardless of its size.

pub mod note_query;

pub use note_query::{NotePage, NoteQuery, Page};
