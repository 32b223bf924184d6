//! Note model, mutation payloads and the composed `NoteView` read model.
//!
//! # Invariants
//! - Every tag attached to a note is owned by the note's owner.
//! - `updated_at` strictly increases on every persisted mutation.
//! - `NoteView` is built fresh per query; it is never cached or persisted.

use crate::error::{CoreError, CoreResult};
use crate::model::tag::{TagId, TagView};
use crate::model::user::UserId;
use crate::model::Timestamp;
use serde::Serialize;

pub type NoteId = i64;

const TITLE_MAX_CHARS: usize = 255;

/// Persisted note row (without tag associations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    /// When `None`, the configured summarizer is consulted best-effort.
    pub summary: Option<String>,
    /// Must all resolve to tags owned by the creator.
    pub tag_ids: Vec<TagId>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_tags(mut self, tag_ids: impl Into<Vec<TagId>>) -> Self {
        self.tag_ids = tag_ids.into();
        self
    }
}

/// Partial update. Absent fields are left unchanged.
///
/// `tag_ids: Some(vec![])` clears every tag; `tag_ids: None` keeps the
/// current tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    /// A present but blank summary clears it.
    pub summary: Option<String>,
    pub tag_ids: Option<Vec<TagId>>,
}

impl NotePatch {
    /// True when no field is present; applying it must not touch the row.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.summary.is_none()
            && self.tag_ids.is_none()
    }
}

/// Per-request composed note representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteView {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Ordered by tag id.
    pub tags: Vec<TagView>,
    /// Favorite status for the requesting user.
    pub is_favorited: bool,
}

impl NoteView {
    pub fn from_note(note: Note, tags: Vec<TagView>, is_favorited: bool) -> Self {
        Self {
            id: note.id,
            user_id: note.user_id,
            title: note.title,
            content: note.content,
            summary: note.summary,
            created_at: note.created_at,
            updated_at: note.updated_at,
            tags,
            is_favorited,
        }
    }
}

/// Trims a title and enforces `1..=255` characters.
pub fn normalize_title(title: &str) -> CoreResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("note title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(CoreError::Validation(format!(
            "note title must be {TITLE_MAX_CHARS} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Drops blank summaries so storage never holds whitespace-only text.
pub(crate) fn normalize_summary(summary: Option<&str>) -> Option<String> {
    summary
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
