//! Favorite index: the "user favorited note" relation.
//!
//! # Invariants
//! - `(user_id, note_id)` is unique; a second add is a `Conflict`.
//! - Favoriting only requires the note to exist, not to be owned.
//! - Favorite listings contain every note the user favorited, including
//!   notes owned by other users.

use crate::error::{conflict_or_store, CoreError, CoreResult, Entity};
use crate::model::favorite::Favorite;
use crate::model::note::NoteId;
use crate::model::now_millis;
use crate::model::user::UserId;
use crate::query::{NotePage, NoteQuery, Page};
use crate::repo::ensure_write_tx;
use crate::repo::note_repo::note_owner;
use rusqlite::{params, Connection};

const ALREADY_FAVORITED: &str = "note is already favorited";

pub trait FavoriteIndex {
    /// `NotFound` when the note does not exist.
    fn add(&self, user_id: UserId, note_id: NoteId) -> CoreResult<Favorite>;
    /// `NotFound` when the note is not currently favorited by `user_id`.
    fn remove(&self, user_id: UserId, note_id: NoteId) -> CoreResult<()>;
    fn is_favorited(&self, user_id: UserId, note_id: NoteId) -> CoreResult<bool>;
    /// Most recently favorited first; every item has `is_favorited = true`.
    fn list_favorites(&self, user_id: UserId, page: Page) -> CoreResult<NotePage>;
}

pub struct SqliteFavoriteIndex<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFavoriteIndex<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FavoriteIndex for SqliteFavoriteIndex<'_> {
    fn add(&self, user_id: UserId, note_id: NoteId) -> CoreResult<Favorite> {
        ensure_write_tx(self.conn)?;
        if note_owner(self.conn, note_id)?.is_none() {
            return Err(CoreError::NotFound {
                entity: Entity::Note,
                id: note_id,
            });
        }
        if self.is_favorited(user_id, note_id)? {
            return Err(CoreError::Conflict(ALREADY_FAVORITED.to_string()));
        }

        let created_at = now_millis();
        self.conn
            .execute(
                "INSERT INTO favorites (user_id, note_id, created_at) VALUES (?1, ?2, ?3);",
                params![user_id, note_id, created_at],
            )
            .map_err(|err| conflict_or_store(err, |_| ALREADY_FAVORITED.to_string()))?;

        Ok(Favorite {
            id: self.conn.last_insert_rowid(),
            user_id,
            note_id,
            created_at,
        })
    }

    fn remove(&self, user_id: UserId, note_id: NoteId) -> CoreResult<()> {
        ensure_write_tx(self.conn)?;
        let deleted = self.conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND note_id = ?2;",
            params![user_id, note_id],
        )?;
        if deleted == 0 {
            return Err(CoreError::NotFound {
                entity: Entity::Favorite,
                id: note_id,
            });
        }
        Ok(())
    }

    fn is_favorited(&self, user_id: UserId, note_id: NoteId) -> CoreResult<bool> {
        let favorited: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = ?1 AND note_id = ?2);",
            params![user_id, note_id],
            |row| row.get(0),
        )?;
        Ok(favorited)
    }

    fn list_favorites(&self, user_id: UserId, page: Page) -> CoreResult<NotePage> {
        NoteQuery::favorited_by(user_id).page(page).fetch(self.conn)
    }
}
