//! Identity store: user records with unique username and email.

use crate::error::{conflict_or_store, CoreError, CoreResult};
use crate::model::now_millis;
use crate::model::user::{NewUser, User, UserId};
use crate::repo::ensure_write_tx;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USERNAME_TAKEN: &str = "username already registered";
const EMAIL_TAKEN: &str = "email already registered";
const USER_SELECT_SQL: &str = "SELECT id, username, email, password_hash, created_at FROM users";

pub trait IdentityStore {
    /// Inserts a user. `Conflict` when the username or email is taken.
    fn create_user(&self, user: &NewUser) -> CoreResult<User>;
    fn get_user(&self, id: UserId) -> CoreResult<Option<User>>;
    /// Looks up by (already lowercased) email.
    fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;
    /// Case-insensitive lookup.
    fn find_by_username(&self, username: &str) -> CoreResult<Option<User>>;
}

pub struct SqliteIdentityStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn find_one(&self, filter: &str, value: &str) -> CoreResult<Option<User>> {
        let sql = format!("{USER_SELECT_SQL} WHERE {filter} = ?1;");
        let user = self
            .conn
            .query_row(&sql, [value], parse_user_row)
            .optional()?;
        Ok(user)
    }
}

impl IdentityStore for SqliteIdentityStore<'_> {
    fn create_user(&self, user: &NewUser) -> CoreResult<User> {
        ensure_write_tx(self.conn)?;

        if self.find_by_username(&user.username)?.is_some() {
            return Err(username_taken());
        }
        if self.find_by_email(&user.email)?.is_some() {
            return Err(email_taken());
        }

        let created_at = now_millis();
        self.conn
            .execute(
                "INSERT INTO users (username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    user.username.as_str(),
                    user.email.as_str(),
                    user.password_hash.as_str(),
                    created_at,
                ],
            )
            .map_err(|err| {
                conflict_or_store(err, |message| {
                    if message.contains("users.email") {
                        EMAIL_TAKEN.to_string()
                    } else {
                        USERNAME_TAKEN.to_string()
                    }
                })
            })?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at,
        })
    }

    fn get_user(&self, id: UserId) -> CoreResult<Option<User>> {
        let sql = format!("{USER_SELECT_SQL} WHERE id = ?1;");
        let user = self
            .conn
            .query_row(&sql, [id], parse_user_row)
            .optional()?;
        Ok(user)
    }

    fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        self.find_one("email", email)
    }

    fn find_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        self.find_one("username", username)
    }
}

fn username_taken() -> CoreError {
    CoreError::Conflict(USERNAME_TAKEN.to_string())
}

fn email_taken() -> CoreError {
    CoreError::Conflict(EMAIL_TAKEN.to_string())
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}
