//! Tag model. Tags are private to their owner.

use crate::error::{CoreError, CoreResult};
use crate::model::user::UserId;
use serde::Serialize;

pub type TagId = i64;

const TAG_NAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
}

/// Tag projection embedded in note views and returned by tag operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub id: TagId,
    pub name: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
        }
    }
}

/// Trims a tag name and enforces `1..=50` characters.
///
/// Case is preserved; uniqueness per owner is case-insensitive in storage.
pub fn normalize_tag_name(name: &str) -> CoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("tag name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > TAG_NAME_MAX_CHARS {
        return Err(CoreError::Validation(format!(
            "tag name must be {TAG_NAME_MAX_CHARS} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}
