//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and their tag sets.
//! - Serve every note read through the shared `NoteQuery` builder.
//!
//! # Invariants
//! - Tag references must resolve to tags owned by the note owner; a bad
//!   reference fails the whole write (`InvalidReference`).
//! - `updated_at` is strictly increasing per note: every persisted mutation
//!   writes `max(now, updated_at + 1)`.
//! - Reads collapse "missing" and "not yours" into absence.

use crate::access::authorize;
use crate::error::{CoreError, CoreResult, Entity};
use crate::model::note::{normalize_summary, normalize_title, NewNote, NoteId, NotePatch, NoteView};
use crate::model::now_millis;
use crate::model::tag::TagId;
use crate::model::user::UserId;
use crate::query::{NotePage, NoteQuery, Page};
use crate::repo::ensure_write_tx;
use crate::repo::note_tag_repo::NoteTagRepository;
use crate::repo::tag_repo::{SqliteTagStore, TagStore};
use crate::search::fts::build_match_expression;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

pub trait NoteRepository {
    fn create(&self, owner: UserId, note: &NewNote) -> CoreResult<NoteView>;
    /// Applies the present fields of `patch`. An empty patch changes nothing.
    fn update(&self, note_id: NoteId, owner: UserId, patch: &NotePatch) -> CoreResult<NoteView>;
    /// Deletes the note; favorites and tag links cascade.
    fn delete(&self, note_id: NoteId, owner: UserId) -> CoreResult<()>;
    fn get(&self, note_id: NoteId, owner: UserId) -> CoreResult<Option<NoteView>>;
    /// Owner's notes, most recently updated first.
    fn list(&self, owner: UserId, page: Page) -> CoreResult<NotePage>;
    /// Owner's notes carrying any of `tag_ids`, each at most once.
    fn list_by_tags(&self, owner: UserId, tag_ids: &[TagId], page: Page) -> CoreResult<NotePage>;
    /// Owner's notes matching every significant term of `text`, best first.
    fn search(&self, owner: UserId, text: &str, page: Page) -> CoreResult<Vec<NoteView>>;
}

pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_view(&self, note_id: NoteId, owner: UserId) -> CoreResult<NoteView> {
        NoteQuery::owned_by(owner)
            .note(note_id)
            .fetch_one(self.conn)?
            .ok_or_else(|| CoreError::invalid_data(format!("note {note_id} vanished after write")))
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create(&self, owner: UserId, note: &NewNote) -> CoreResult<NoteView> {
        let title = normalize_title(&note.title)?;
        let summary = normalize_summary(note.summary.as_deref());
        ensure_write_tx(self.conn)?;

        let tag_ids = SqliteTagStore::new(self.conn).resolve_owned(owner, &note.tag_ids)?;
        let now = now_millis();
        self.conn.execute(
            "INSERT INTO notes (user_id, title, content, summary, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![owner, title.as_str(), note.content.as_str(), summary, now],
        )?;
        let note_id = self.conn.last_insert_rowid();
        NoteTagRepository::new(self.conn).replace_for_note(note_id, &tag_ids)?;

        self.load_view(note_id, owner)
    }

    fn update(&self, note_id: NoteId, owner: UserId, patch: &NotePatch) -> CoreResult<NoteView> {
        authorize(note_owner(self.conn, note_id)?, owner).require(Entity::Note, note_id)?;
        if patch.is_empty() {
            return self.load_view(note_id, owner);
        }

        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        ensure_write_tx(self.conn)?;
        let tag_ids = match patch.tag_ids.as_deref() {
            Some(ids) => Some(SqliteTagStore::new(self.conn).resolve_owned(owner, ids)?),
            None => None,
        };

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(title) = title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title));
        }
        if let Some(content) = patch.content.as_ref() {
            assignments.push("content = ?");
            bind_values.push(Value::Text(content.clone()));
        }
        if let Some(summary) = patch.summary.as_deref() {
            // A blank summary clears the column.
            assignments.push("summary = ?");
            bind_values.push(match normalize_summary(Some(summary)) {
                Some(value) => Value::Text(value),
                None => Value::Null,
            });
        }

        if assignments.is_empty() {
            touch_note(self.conn, note_id)?;
        } else {
            assignments.push("updated_at = MAX(?, updated_at + 1)");
            bind_values.push(Value::Integer(now_millis()));
            bind_values.push(Value::Integer(note_id));
            let sql = format!("UPDATE notes SET {} WHERE id = ?;", assignments.join(", "));
            self.conn.execute(&sql, params_from_iter(bind_values))?;
        }

        if let Some(tag_ids) = tag_ids {
            NoteTagRepository::new(self.conn).replace_for_note(note_id, &tag_ids)?;
        }

        self.load_view(note_id, owner)
    }

    fn delete(&self, note_id: NoteId, owner: UserId) -> CoreResult<()> {
        ensure_write_tx(self.conn)?;
        authorize(note_owner(self.conn, note_id)?, owner).require(Entity::Note, note_id)?;
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1;", [note_id])?;
        Ok(())
    }

    fn get(&self, note_id: NoteId, owner: UserId) -> CoreResult<Option<NoteView>> {
        NoteQuery::owned_by(owner).note(note_id).fetch_one(self.conn)
    }

    fn list(&self, owner: UserId, page: Page) -> CoreResult<NotePage> {
        NoteQuery::owned_by(owner).page(page).fetch(self.conn)
    }

    fn list_by_tags(&self, owner: UserId, tag_ids: &[TagId], page: Page) -> CoreResult<NotePage> {
        if tag_ids.is_empty() {
            return Ok(NotePage::default());
        }
        NoteQuery::owned_by(owner)
            .with_tags(tag_ids)
            .page(page)
            .fetch(self.conn)
    }

    fn search(&self, owner: UserId, text: &str, page: Page) -> CoreResult<Vec<NoteView>> {
        let Some(match_expr) = build_match_expression(text) else {
            return Ok(Vec::new());
        };
        NoteQuery::owned_by(owner)
            .matching(match_expr)
            .page(page)
            .fetch_items(self.conn)
    }
}

/// Owner of a note, or `None` when the note does not exist.
pub(crate) fn note_owner(conn: &Connection, note_id: NoteId) -> CoreResult<Option<UserId>> {
    let owner = conn
        .query_row("SELECT user_id FROM notes WHERE id = ?1;", [note_id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(owner)
}

/// Advances `updated_at` without touching any other column.
pub(crate) fn touch_note(conn: &Connection, note_id: NoteId) -> CoreResult<()> {
    conn.execute(
        "UPDATE notes SET updated_at = MAX(?1, updated_at + 1) WHERE id = ?2;",
        params![now_millis(), note_id],
    )?;
    Ok(())
}
