//! Tag store: per-user tags and their attachment to notes.
//!
//! # Invariants
//! - `(user_id, name)` is unique, compared case-insensitively.
//! - A tag is only ever linked to notes of the same owner.
//! - Ownership misses come back as [`Outcome`], never as silent `None`.

use crate::access::{authorize, Access, Outcome};
use crate::error::{conflict_or_store, CoreError, CoreResult, Entity};
use crate::model::note::NoteId;
use crate::model::tag::{normalize_tag_name, Tag, TagId};
use crate::model::user::UserId;
use crate::repo::ensure_write_tx;
use crate::repo::note_repo::{note_owner, touch_note};
use crate::repo::note_tag_repo::NoteTagRepository;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

pub trait TagStore {
    /// `Conflict` when the owner already has a tag with that name.
    fn create(&self, owner: UserId, name: &str) -> CoreResult<Tag>;
    /// Owner's tags ordered by id.
    fn list(&self, owner: UserId) -> CoreResult<Vec<Tag>>;
    fn rename(&self, tag_id: TagId, owner: UserId, new_name: &str) -> CoreResult<Outcome<Tag>>;
    /// Deletes the tag and detaches it from every note.
    fn delete(&self, tag_id: TagId, owner: UserId) -> CoreResult<Outcome<Tag>>;
    /// Links `tag_id` to `note_id`; both must belong to `owner`.
    /// `Done(true)` when a link was created.
    fn attach(&self, note_id: NoteId, tag_id: TagId, owner: UserId) -> CoreResult<Outcome<bool>>;
    /// `Done(true)` when a link was removed.
    fn detach(&self, note_id: NoteId, tag_id: TagId, owner: UserId) -> CoreResult<Outcome<bool>>;
    /// Deduplicates `tag_ids` and checks each resolves to a tag of `owner`.
    ///
    /// The first id that does not is reported as `InvalidReference`.
    fn resolve_owned(&self, owner: UserId, tag_ids: &[TagId]) -> CoreResult<Vec<TagId>>;
}

pub struct SqliteTagStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get(&self, tag_id: TagId) -> CoreResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT id, user_id, name FROM tags WHERE id = ?1;",
                [tag_id],
                parse_tag_row,
            )
            .optional()?;
        Ok(tag)
    }

    fn name_taken(&self, owner: UserId, name: &str, except: Option<TagId>) -> CoreResult<bool> {
        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM tags
                WHERE user_id = ?1 AND name = ?2 AND id IS NOT ?3
            );",
            params![owner, name, except],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    fn link_access(
        &self,
        note_id: NoteId,
        tag_id: TagId,
        owner: UserId,
    ) -> CoreResult<Access> {
        let note_access = authorize(note_owner(self.conn, note_id)?, owner);
        let tag_access = authorize(self.get(tag_id)?.map(|tag| tag.user_id), owner);
        Ok(note_access.and(tag_access))
    }
}

impl TagStore for SqliteTagStore<'_> {
    fn create(&self, owner: UserId, name: &str) -> CoreResult<Tag> {
        let name = normalize_tag_name(name)?;
        ensure_write_tx(self.conn)?;

        if self.name_taken(owner, &name, None)? {
            return Err(name_conflict(&name));
        }
        self.conn
            .execute(
                "INSERT INTO tags (user_id, name) VALUES (?1, ?2);",
                params![owner, name.as_str()],
            )
            .map_err(|err| conflict_or_store(err, |_| name_conflict_message(&name)))?;

        Ok(Tag {
            id: self.conn.last_insert_rowid(),
            user_id: owner,
            name,
        })
    }

    fn list(&self, owner: UserId) -> CoreResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, name FROM tags WHERE user_id = ?1 ORDER BY id ASC;")?;
        let mut rows = stmt.query([owner])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn rename(&self, tag_id: TagId, owner: UserId, new_name: &str) -> CoreResult<Outcome<Tag>> {
        let name = normalize_tag_name(new_name)?;
        ensure_write_tx(self.conn)?;

        let existing = self.get(tag_id)?;
        authorize(existing.as_ref().map(|tag| tag.user_id), owner).run(|| {
            if self.name_taken(owner, &name, Some(tag_id))? {
                return Err(name_conflict(&name));
            }
            self.conn
                .execute(
                    "UPDATE tags SET name = ?1 WHERE id = ?2;",
                    params![name.as_str(), tag_id],
                )
                .map_err(|err| conflict_or_store(err, |_| name_conflict_message(&name)))?;
            Ok(Tag {
                id: tag_id,
                user_id: owner,
                name: name.clone(),
            })
        })
    }

    fn delete(&self, tag_id: TagId, owner: UserId) -> CoreResult<Outcome<Tag>> {
        ensure_write_tx(self.conn)?;

        let existing = self.get(tag_id)?;
        let access = authorize(existing.as_ref().map(|tag| tag.user_id), owner);
        access.run(|| {
            let tag = existing.ok_or(CoreError::NotFound {
                entity: Entity::Tag,
                id: tag_id,
            })?;
            self.conn
                .execute("DELETE FROM tags WHERE id = ?1;", [tag_id])?;
            Ok(tag)
        })
    }

    fn attach(&self, note_id: NoteId, tag_id: TagId, owner: UserId) -> CoreResult<Outcome<bool>> {
        ensure_write_tx(self.conn)?;
        self.link_access(note_id, tag_id, owner)?.run(|| {
            let linked = NoteTagRepository::new(self.conn).attach(note_id, tag_id)?;
            if linked {
                touch_note(self.conn, note_id)?;
            }
            Ok(linked)
        })
    }

    fn detach(&self, note_id: NoteId, tag_id: TagId, owner: UserId) -> CoreResult<Outcome<bool>> {
        ensure_write_tx(self.conn)?;
        self.link_access(note_id, tag_id, owner)?.run(|| {
            let unlinked = NoteTagRepository::new(self.conn).detach(note_id, tag_id)?;
            if unlinked {
                touch_note(self.conn, note_id)?;
            }
            Ok(unlinked)
        })
    }

    fn resolve_owned(&self, owner: UserId, tag_ids: &[TagId]) -> CoreResult<Vec<TagId>> {
        let mut seen = BTreeSet::new();
        let mut resolved = Vec::new();
        for tag_id in tag_ids.iter().copied() {
            if !seen.insert(tag_id) {
                continue;
            }
            let owned = self.get(tag_id)?.map(|tag| tag.user_id) == Some(owner);
            if !owned {
                return Err(CoreError::InvalidReference {
                    entity: Entity::Tag,
                    id: tag_id,
                });
            }
            resolved.push(tag_id);
        }
        Ok(resolved)
    }
}

fn name_conflict_message(name: &str) -> String {
    format!("tag `{name}` already exists")
}

fn name_conflict(name: &str) -> CoreError {
    CoreError::Conflict(name_conflict_message(name))
}

fn parse_tag_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
    })
}
