//! User (identity) model and registration input rules.

use crate::error::{CoreError, CoreResult};
use crate::model::Timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub type UserId = i64;

const PASSWORD_MIN_CHARS: usize = 8;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,50}$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]{1,64}@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Stored lowercased.
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

/// Insert payload for the identity store. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Public projection of a user (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: Timestamp,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Registration input as received from the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Trims and checks a username: 3-50 chars of `[A-Za-z0-9_.-]`.
pub fn normalize_username(username: &str) -> CoreResult<String> {
    let trimmed = username.trim();
    if !USERNAME_RE.is_match(trimmed) {
        return Err(CoreError::Validation(
            "username must be 3-50 characters of letters, digits, `_`, `.` or `-`".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims, lowercases and shape-checks an email address.
pub fn normalize_email(email: &str) -> CoreResult<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.len() > 120 || !EMAIL_RE.is_match(&normalized) {
        return Err(CoreError::Validation("email address is malformed".to_string()));
    }
    Ok(normalized)
}

pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(CoreError::Validation(format!(
            "password must be at least {PASSWORD_MIN_CHARS} characters"
        )));
    }
    Ok(())
}
