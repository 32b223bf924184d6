//! Core domain logic for notekeep, a multi-user note backend.
//! This crate is the single source of truth for business invariants.

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod search;
pub mod service;
pub mod summarizer;

pub use access::{authorize, Access, Outcome};
pub use auth::{
    AccessToken, Argon2PasswordHasher, AuthError, AuthenticatedUser, Authenticator,
    HmacTokenAuthenticator, PasswordHasher,
};
pub use config::{AuthConfig, ConfigError, CoreConfig, DbConfig, LoggingConfig, QueryConfig};
pub use db::{open_db, open_db_in_memory, DbError, RequestScope};
pub use error::{CoreError, CoreResult, Entity};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::favorite::{Favorite, FavoriteStatus};
pub use model::note::{NewNote, Note, NoteId, NotePatch, NoteView};
pub use model::tag::{Tag, TagId, TagView};
pub use model::user::{RegisterRequest, User, UserId, UserView};
pub use query::{NotePage, NoteQuery, Page};
pub use service::account_service::AccountService;
pub use service::favorite_service::FavoriteService;
pub use service::note_service::NoteService;
pub use service::tag_service::TagService;
pub use summarizer::{NoopSummarizer, SummaryError, Summarizer};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
