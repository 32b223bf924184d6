//! Note-tag join table repository.
//!
//! # Responsibility
//! - Own every statement touching `note_tags`.
//! - Batch-load tags for a page of notes in one statement.
//!
//! # Invariants
//! - Operates on opaque ids; ownership checks happen in the callers.
//! - Tag lists are ordered by tag id.

use crate::error::CoreResult;
use crate::model::note::NoteId;
use crate::model::tag::{TagId, TagView};
use crate::repo::ensure_write_tx;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::{BTreeSet, HashMap};

pub struct NoteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NoteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Links a tag to a note. Returns `false` when the link already existed.
    pub fn attach(&self, note_id: NoteId, tag_id: TagId) -> CoreResult<bool> {
        ensure_write_tx(self.conn)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2);",
            params![note_id, tag_id],
        )?;
        Ok(inserted > 0)
    }

    /// Unlinks a tag from a note. Returns `false` when there was no link.
    pub fn detach(&self, note_id: NoteId, tag_id: TagId) -> CoreResult<bool> {
        ensure_write_tx(self.conn)?;
        let deleted = self.conn.execute(
            "DELETE FROM note_tags WHERE note_id = ?1 AND tag_id = ?2;",
            params![note_id, tag_id],
        )?;
        Ok(deleted > 0)
    }

    pub fn list_for_note(&self, note_id: NoteId) -> CoreResult<Vec<TagView>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.name
             FROM note_tags nt
             INNER JOIN tags t ON t.id = nt.tag_id
             WHERE nt.note_id = ?1
             ORDER BY t.id ASC;",
        )?;
        let mut rows = stmt.query([note_id])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(TagView {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(tags)
    }

    pub fn list_for_tag(&self, tag_id: TagId) -> CoreResult<Vec<NoteId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT note_id FROM note_tags WHERE tag_id = ?1 ORDER BY note_id ASC;")?;
        let mut rows = stmt.query([tag_id])?;
        let mut note_ids = Vec::new();
        while let Some(row) = rows.next()? {
            note_ids.push(row.get(0)?);
        }
        Ok(note_ids)
    }

    /// Replaces the whole tag set of a note. Returns `true` when the set
    /// changed.
    pub fn replace_for_note(&self, note_id: NoteId, tag_ids: &[TagId]) -> CoreResult<bool> {
        ensure_write_tx(self.conn)?;
        let wanted = tag_ids.iter().copied().collect::<BTreeSet<_>>();
        let current = self
            .list_for_note(note_id)?
            .into_iter()
            .map(|tag| tag.id)
            .collect::<BTreeSet<_>>();
        if wanted == current {
            return Ok(false);
        }

        for stale in current.difference(&wanted) {
            self.detach(note_id, *stale)?;
        }
        for added in wanted.difference(&current) {
            self.attach(note_id, *added)?;
        }
        Ok(true)
    }

    /// Loads tags for many notes with one statement.
    ///
    /// Notes without tags are absent from the returned map.
    pub fn load_for_notes(&self, note_ids: &[NoteId]) -> CoreResult<HashMap<NoteId, Vec<TagView>>> {
        let mut tags_by_note: HashMap<NoteId, Vec<TagView>> = HashMap::new();
        if note_ids.is_empty() {
            return Ok(tags_by_note);
        }

        let placeholders = vec!["?"; note_ids.len()].join(", ");
        let sql = format!(
            "SELECT nt.note_id, t.id, t.name
             FROM note_tags nt
             INNER JOIN tags t ON t.id = nt.tag_id
             WHERE nt.note_id IN ({placeholders})
             ORDER BY nt.note_id ASC, t.id ASC;"
        );
        let bind_values = note_ids.iter().map(|id| Value::Integer(*id));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        while let Some(row) = rows.next()? {
            let note_id: NoteId = row.get(0)?;
            tags_by_note.entry(note_id).or_default().push(TagView {
                id: row.get(1)?,
                name: row.get(2)?,
            });
        }
        Ok(tags_by_note)
    }
}
