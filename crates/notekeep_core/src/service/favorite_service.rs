//! Favorite use-case service.

use crate::auth::AuthenticatedUser;
use crate::config::QueryConfig;
use crate::db::RequestScope;
use crate::error::CoreResult;
use crate::model::favorite::{Favorite, FavoriteStatus};
use crate::model::note::NoteId;
use crate::query::{NotePage, Page};
use crate::repo::favorite_repo::{FavoriteIndex, SqliteFavoriteIndex};

pub struct FavoriteService {
    query: QueryConfig,
}

impl FavoriteService {
    pub fn new(query: QueryConfig) -> Self {
        Self { query }
    }

    /// `NotFound` for a missing note, `Conflict` when already favorited.
    pub fn add_favorite(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
    ) -> CoreResult<Favorite> {
        scope.write("favorite_add", |tx| {
            SqliteFavoriteIndex::new(tx).add(user.user_id(), note_id)
        })
    }

    /// `NotFound` when the note is not currently favorited.
    pub fn remove_favorite(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
    ) -> CoreResult<()> {
        scope.write("favorite_remove", |tx| {
            SqliteFavoriteIndex::new(tx).remove(user.user_id(), note_id)
        })
    }

    pub fn favorite_status(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        note_id: NoteId,
    ) -> CoreResult<FavoriteStatus> {
        let is_favorited = scope.read("favorite_status", |tx| {
            SqliteFavoriteIndex::new(tx).is_favorited(user.user_id(), note_id)
        })?;
        Ok(FavoriteStatus {
            note_id,
            is_favorited,
        })
    }

    pub fn list_favorites(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        skip: u32,
        limit: Option<u32>,
    ) -> CoreResult<NotePage> {
        let page = Page::new(skip, limit, &self.query);
        scope.read("favorite_list", |tx| {
            SqliteFavoriteIndex::new(tx).list_favorites(user.user_id(), page)
        })
    }
}
