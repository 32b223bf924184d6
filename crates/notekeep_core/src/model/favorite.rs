//! Favorite join record: "user favorited note".

use crate::model::note::NoteId;
use crate::model::user::UserId;
use crate::model::Timestamp;
use serde::Serialize;

pub type FavoriteId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub note_id: NoteId,
    pub created_at: Timestamp,
}

/// Answer to "has the caller favorited this note?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteStatus {
    pub note_id: NoteId,
    pub is_favorited: bool,
}
