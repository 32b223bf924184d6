//! Note use-case service.
//!
//! # Responsibility
//! - Expose create/update/delete/get/list/tag-filter/search note APIs for an
//!   authenticated caller.
//! - Fill in a best-effort summary on create and serve explicit summary
//!   generation.
//!
//! # Invariants
//! - The summarizer is never called inside a store transaction.
//! - Summarizer failures never block note creation.

use crate::auth::AuthenticatedUser;
use crate::config::QueryConfig;
use crate::db::RequestScope;
use crate::error::{CoreError, CoreResult};
use crate::model::note::{NewNote, NoteId, NotePatch, NoteView};
use crate::model::tag::TagId;
use crate::query::{NotePage, Page};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::summarizer::{summarize_best_effort, Summarizer};
use log::{info, warn};

pub struct NoteService {
    query: QueryConfig,
    summarizer: Box<dyn Summarizer>,
}

impl NoteService {
    pub fn new(query: QueryConfig, summarizer: Box<dyn Summarizer>) -> Self {
        Self { query, summarizer }
    }

    /// Creates a note owned by the caller.
    ///
    /// When `note.summary` is absent the summarizer is consulted first.
    pub fn create_note(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        mut note: NewNote,
    ) -> CoreResult<NoteView> {
        if note.summary.is_none() {
            note.summary = summarize_best_effort(self.summarizer.as_ref(), &note.title, &note.content);
        }
        let view = scope.write("note_create", |tx| {
            SqliteNoteRepository::new(tx).create(user.user_id(), &note)
        })?;
        info!(
            "event=note_create module=service status=ok request_id={} user_id={} note_id={} tag_count={}",
            scope.request_id(),
            user.user_id(),
            view.id,
            view.tags.len()
        );
        Ok(view)
    }

    pub fn update_note(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
        patch: &NotePatch,
    ) -> CoreResult<NoteView> {
        scope.write("note_update", |tx| {
            SqliteNoteRepository::new(tx).update(note_id, user.user_id(), patch)
        })
    }

    pub fn delete_note(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
    ) -> CoreResult<()> {
        scope.write("note_delete", |tx| {
            SqliteNoteRepository::new(tx).delete(note_id, user.user_id())
        })
    }

    /// `None` when the note is missing or owned by someone else.
    pub fn get_note(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
    ) -> CoreResult<Option<NoteView>> {
        scope.read("note_get", |tx| {
            SqliteNoteRepository::new(tx).get(note_id, user.user_id())
        })
    }

    pub fn list_notes(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        skip: u32,
        limit: Option<u32>,
    ) -> CoreResult<NotePage> {
        let page = Page::new(skip, limit, &self.query);
        scope.read("note_list", |tx| {
            SqliteNoteRepository::new(tx).list(user.user_id(), page)
        })
    }

    /// Union tag filter. An empty `tag_ids` yields an empty page.
    pub fn list_notes_by_tags(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        tag_ids: &[TagId],
        skip: u32,
        limit: Option<u32>,
    ) -> CoreResult<NotePage> {
        let page = Page::new(skip, limit, &self.query);
        scope.read("note_list_by_tags", |tx| {
            SqliteNoteRepository::new(tx).list_by_tags(user.user_id(), tag_ids, page)
        })
    }

    /// Full-text search. Blank text yields no results.
    pub fn search_notes(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        text: &str,
        skip: u32,
        limit: Option<u32>,
    ) -> CoreResult<Vec<NoteView>> {
        let page = Page::new(skip, limit, &self.query);
        scope.read("note_search", |tx| {
            SqliteNoteRepository::new(tx).search(user.user_id(), text, page)
        })
    }

    /// Asks the summarizer directly.
    ///
    /// `SummaryUnavailable` when it fails or has nothing to return.
    pub fn generate_summary(
        &self,
        user: &AuthenticatedUser,
        title: &str,
        content: &str,
    ) -> CoreResult<String> {
        match self.summarizer.generate(title, content) {
            Ok(Some(summary)) if !summary.trim().is_empty() => Ok(summary.trim().to_string()),
            Ok(_) => Err(CoreError::SummaryUnavailable),
            Err(err) => {
                warn!(
                    "event=summary_generate module=service status=error user_id={} error={err}",
                    user.user_id()
                );
                Err(CoreError::SummaryUnavailable)
            }
        }
    }
}
