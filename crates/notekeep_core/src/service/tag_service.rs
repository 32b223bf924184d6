//! Tag use-case service.
//!
//! Ownership misses are returned as [`Outcome`]; callers pick
//! `into_option` (absent) or `into_result` (strict errors).

use crate::access::Outcome;
use crate::auth::AuthenticatedUser;
use crate::db::RequestScope;
use crate::error::CoreResult;
use crate::model::note::{NoteId, NoteView};
use crate::model::tag::{TagId, TagView};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::tag_repo::{SqliteTagStore, TagStore};
use rusqlite::Connection;

#[derive(Debug, Default, Clone, Copy)]
pub struct TagService;

impl TagService {
    pub fn new() -> Self {
        Self
    }

    pub fn create_tag(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        name: &str,
    ) -> CoreResult<TagView> {
        let tag = scope.write("tag_create", |tx| {
            SqliteTagStore::new(tx).create(user.user_id(), name)
        })?;
        Ok(TagView::from(&tag))
    }

    pub fn list_tags(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
    ) -> CoreResult<Vec<TagView>> {
        let tags = scope.read("tag_list", |tx| SqliteTagStore::new(tx).list(user.user_id()))?;
        Ok(tags.iter().map(TagView::from).collect())
    }

    pub fn rename_tag(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        tag_id: TagId,
        new_name: &str,
    ) -> CoreResult<Outcome<TagView>> {
        let outcome = scope.write("tag_rename", |tx| {
            SqliteTagStore::new(tx).rename(tag_id, user.user_id(), new_name)
        })?;
        Ok(outcome.map(|tag| TagView::from(&tag)))
    }

    pub fn delete_tag(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        tag_id: TagId,
    ) -> CoreResult<Outcome<TagView>> {
        let outcome = scope.write("tag_delete", |tx| {
            SqliteTagStore::new(tx).delete(tag_id, user.user_id())
        })?;
        Ok(outcome.map(|tag| TagView::from(&tag)))
    }

    /// Links a tag to a note and returns the refreshed note.
    pub fn attach_tag(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
        tag_id: TagId,
    ) -> CoreResult<Outcome<NoteView>> {
        scope.write("tag_attach", |tx| {
            let linked = SqliteTagStore::new(tx).attach(note_id, tag_id, user.user_id())?;
            refreshed_note(tx, linked, note_id, user)
        })
    }

    pub fn detach_tag(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
        tag_id: TagId,
    ) -> CoreResult<Outcome<NoteView>> {
        scope.write("tag_detach", |tx| {
            let unlinked = SqliteTagStore::new(tx).detach(note_id, tag_id, user.user_id())?;
            refreshed_note(tx, unlinked, note_id, user)
        })
    }
}

fn refreshed_note(
    conn: &Connection,
    outcome: Outcome<bool>,
    note_id: NoteId,
    user: &AuthenticatedUser,
) -> CoreResult<Outcome<NoteView>> {
    match outcome {
        Outcome::Done(_) => Ok(SqliteNoteRepository::new(conn)
            .get(note_id, user.user_id())?
            .map_or(Outcome::NotFound, Outcome::Done)),
        Outcome::NotFound => Ok(Outcome::NotFound),
        Outcome::Forbidden => Ok(Outcome::Forbidden),
    }
}
