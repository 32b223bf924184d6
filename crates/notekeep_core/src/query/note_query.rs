//! Parameterized note query builder.
//!
//! A [`NoteQuery`] is `scope ∧ [note id] ∧ [any-of tag set] ∧ [text match]`,
//! annotated with the viewer's favorite status and paginated. The viewer is
//! always the scope's user; only the favorites scope may yield notes owned
//! by someone else.

use crate::config::QueryConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::note::{Note, NoteId, NoteView};
use crate::model::tag::TagId;
use crate::model::user::UserId;
use crate::repo::note_tag_repo::NoteTagRepository;
use crate::search::fts::is_match_syntax_error;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;

const NOTE_COLUMNS: &str = "n.id, n.user_id, n.title, n.content, n.summary, n.created_at, n.updated_at";

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    skip: u32,
    limit: u32,
}

impl Page {
    /// Builds a window; a missing or zero limit falls back to the configured
    /// default and larger limits are clamped to the configured maximum.
    pub fn new(skip: u32, limit: Option<u32>, config: &QueryConfig) -> Self {
        let limit = match limit {
            None | Some(0) => config.default_limit,
            Some(value) => value.min(config.max_limit),
        };
        Self { skip, limit }
    }

    /// First page with the default size.
    pub fn first(config: &QueryConfig) -> Self {
        Self::new(0, None, config)
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// One page of notes plus the total number of matching notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePage {
    pub items: Vec<NoteView>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteScope {
    /// Notes owned by the user.
    OwnedBy(UserId),
    /// Notes favorited by the user, whoever owns them.
    FavoritedBy(UserId),
}

impl NoteScope {
    fn viewer(self) -> UserId {
        match self {
            Self::OwnedBy(user_id) | Self::FavoritedBy(user_id) => user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuery {
    scope: NoteScope,
    note_id: Option<NoteId>,
    tag_ids: Vec<TagId>,
    match_expr: Option<String>,
    page: Option<Page>,
}

impl NoteQuery {
    pub fn owned_by(user_id: UserId) -> Self {
        Self::with_scope(NoteScope::OwnedBy(user_id))
    }

    pub fn favorited_by(user_id: UserId) -> Self {
        Self::with_scope(NoteScope::FavoritedBy(user_id))
    }

    fn with_scope(scope: NoteScope) -> Self {
        Self {
            scope,
            note_id: None,
            tag_ids: Vec::new(),
            match_expr: None,
            page: None,
        }
    }

    /// Restricts to a single note.
    pub fn note(mut self, note_id: NoteId) -> Self {
        self.note_id = Some(note_id);
        self
    }

    /// Union tag filter: notes carrying at least one of `tag_ids`.
    ///
    /// An empty slice adds no filter; callers decide what an empty tag
    /// request means.
    pub fn with_tags(mut self, tag_ids: &[TagId]) -> Self {
        self.tag_ids = tag_ids.to_vec();
        self.tag_ids.sort_unstable();
        self.tag_ids.dedup();
        self
    }

    /// Full-text filter using a prepared FTS5 expression
    /// (see `search::fts::build_match_expression`). Results rank by relevance.
    pub fn matching(mut self, match_expr: impl Into<String>) -> Self {
        self.match_expr = Some(match_expr.into());
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// Runs count and page statements and returns both.
    pub fn fetch(&self, conn: &Connection) -> CoreResult<NotePage> {
        let total = self.count(conn)?;
        let items = if total == 0 {
            Vec::new()
        } else {
            self.fetch_items(conn)?
        };
        Ok(NotePage { items, total })
    }

    /// Runs only the page statement.
    pub fn fetch_items(&self, conn: &Connection) -> CoreResult<Vec<NoteView>> {
        let (filter_sql, filter_binds) = self.compile_filter();
        let mut sql = format!(
            "SELECT {NOTE_COLUMNS},
                EXISTS(
                    SELECT 1 FROM favorites f
                    WHERE f.note_id = n.id AND f.user_id = ?
                ) AS is_favorited
             {filter_sql}
             ORDER BY {}",
            self.order_by()
        );
        let mut bind_values = vec![Value::Integer(self.scope.viewer())];
        bind_values.extend(filter_binds);

        if let Some(page) = self.page {
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(i64::from(page.limit)));
            bind_values.push(Value::Integer(i64::from(page.skip)));
        }

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(|err| self.map_query_error(err))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next().map_err(|err| self.map_query_error(err))? {
            let is_favorited: bool = row.get("is_favorited")?;
            notes.push((parse_note_row(row)?, is_favorited));
        }

        let note_ids = notes.iter().map(|(note, _)| note.id).collect::<Vec<_>>();
        let mut tags = NoteTagRepository::new(conn).load_for_notes(&note_ids)?;
        Ok(notes
            .into_iter()
            .map(|(note, is_favorited)| {
                let note_tags = tags.remove(&note.id).unwrap_or_default();
                NoteView::from_note(note, note_tags, is_favorited)
            })
            .collect())
    }

    /// Fetches the first matching note, if any.
    pub fn fetch_one(&self, conn: &Connection) -> CoreResult<Option<NoteView>> {
        Ok(self.fetch_items(conn)?.into_iter().next())
    }

    fn count(&self, conn: &Connection) -> CoreResult<u64> {
        let (filter_sql, bind_values) = self.compile_filter();
        let sql = format!("SELECT COUNT(*) {filter_sql}");
        let total: i64 = conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))
            .map_err(|err| self.map_query_error(err))?;
        u64::try_from(total).map_err(|_| CoreError::invalid_data(format!("negative count {total}")))
    }

    /// `FROM ... WHERE ...` shared by the count and page statements.
    fn compile_filter(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("FROM notes n");
        let mut bind_values: Vec<Value> = Vec::new();

        if let NoteScope::FavoritedBy(user_id) = self.scope {
            sql.push_str(" INNER JOIN favorites fav ON fav.note_id = n.id AND fav.user_id = ?");
            bind_values.push(Value::Integer(user_id));
        }
        if self.match_expr.is_some() {
            sql.push_str(" INNER JOIN notes_fts ON notes_fts.rowid = n.id");
        }

        let mut conditions: Vec<String> = Vec::new();
        if let NoteScope::OwnedBy(user_id) = self.scope {
            conditions.push("n.user_id = ?".to_string());
            bind_values.push(Value::Integer(user_id));
        }

        if let Some(note_id) = self.note_id {
            conditions.push("n.id = ?".to_string());
            bind_values.push(Value::Integer(note_id));
        }

        if !self.tag_ids.is_empty() {
            let placeholders = vec!["?"; self.tag_ids.len()].join(", ");
            conditions.push(format!(
                "EXISTS (
                    SELECT 1 FROM note_tags nt
                    WHERE nt.note_id = n.id AND nt.tag_id IN ({placeholders})
                )"
            ));
            bind_values.extend(self.tag_ids.iter().map(|tag_id| Value::Integer(*tag_id)));
        }

        if let Some(match_expr) = self.match_expr.as_ref() {
            conditions.push("notes_fts MATCH ?".to_string());
            bind_values.push(Value::Text(match_expr.clone()));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        (sql, bind_values)
    }

    fn order_by(&self) -> &'static str {
        if self.match_expr.is_some() {
            "bm25(notes_fts), n.updated_at DESC, n.id DESC"
        } else if matches!(self.scope, NoteScope::FavoritedBy(_)) {
            "fav.created_at DESC, fav.id DESC"
        } else {
            "n.updated_at DESC, n.id DESC"
        }
    }

    fn map_query_error(&self, err: rusqlite::Error) -> CoreError {
        if self.match_expr.is_some() && is_match_syntax_error(&err) {
            return CoreError::Validation("search query is not a valid expression".to_string());
        }
        CoreError::from(err)
    }
}

pub(crate) fn parse_note_row(row: &Row<'_>) -> CoreResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{NoteQuery, Page};
    use crate::config::QueryConfig;

    #[test]
    fn page_limits_fall_back_and_clamp() {
        let config = QueryConfig::default();
        assert_eq!(Page::new(0, None, &config).limit(), 20);
        assert_eq!(Page::new(0, Some(0), &config).limit(), 20);
        assert_eq!(Page::new(5, Some(7), &config).limit(), 7);
        assert_eq!(Page::new(5, Some(500), &config).limit(), 100);
        assert_eq!(Page::new(5, Some(500), &config).skip(), 5);
    }

    #[test]
    fn owned_filter_binds_viewer_once() {
        let (sql, binds) = NoteQuery::owned_by(3).compile_filter();
        assert_eq!(sql, "FROM notes n WHERE n.user_id = ?");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn tag_filter_is_deduplicated_union() {
        let query = NoteQuery::owned_by(1).with_tags(&[4, 2, 4]);
        let (sql, binds) = query.compile_filter();
        assert!(sql.contains("nt.tag_id IN (?, ?)"));
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn favorites_scope_joins_and_orders_by_favorite_time() {
        let query = NoteQuery::favorited_by(9);
        let (sql, binds) = query.compile_filter();
        assert!(sql.contains("INNER JOIN favorites fav"));
        assert!(!sql.contains("n.user_id"));
        assert_eq!(binds.len(), 1);
        assert!(query.order_by().starts_with("fav.created_at DESC"));
    }

    #[test]
    fn text_match_ranks_by_relevance() {
        let query = NoteQuery::owned_by(1).matching("\"budget\"");
        let (sql, _) = query.compile_filter();
        assert!(sql.contains("notes_fts MATCH ?"));
        assert!(query.order_by().starts_with("bm25(notes_fts)"));
    }
}
