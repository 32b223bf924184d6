#![allow(dead_code)]

use notekeep_core::{
    open_db_in_memory, AccountService, Argon2PasswordHasher, AuthenticatedUser, CoreConfig,
    FavoriteService, HmacTokenAuthenticator, NewNote, NoopSummarizer, NoteService, NoteView,
    RegisterRequest, RequestScope, Summarizer, TagId, TagService,
};
use rusqlite::Connection;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password-123";

pub struct Services {
    pub config: CoreConfig,
    pub accounts: AccountService,
    pub notes: NoteService,
    pub tags: TagService,
    pub favorites: FavoriteService,
}

impl Services {
    pub fn new(config: CoreConfig, summarizer: Box<dyn Summarizer>) -> Self {
        Self {
            accounts: AccountService::new(
                Box::new(light_hasher()),
                Box::new(HmacTokenAuthenticator::new(&config.auth)),
            ),
            notes: NoteService::new(config.query, summarizer),
            tags: TagService::new(),
            favorites: FavoriteService::new(config.query),
            config,
        }
    }

    /// Registers `name` (email `<name>@example.com`), logs in and resolves
    /// the issued token.
    pub fn signup(&self, scope: &mut RequestScope<'_>, name: &str) -> AuthenticatedUser {
        self.accounts
            .register(scope, &register_request(name))
            .unwrap();
        let token = self
            .accounts
            .login(scope, &format!("{name}@example.com"), PASSWORD)
            .unwrap();
        self.accounts
            .authenticate(scope, &token.access_token)
            .unwrap()
    }

    pub fn note(
        &self,
        scope: &mut RequestScope<'_>,
        user: &AuthenticatedUser,
        title: &str,
        content: &str,
        tag_ids: &[TagId],
    ) -> NoteView {
        self.notes
            .create_note(
                scope,
                user,
                NewNote::new(title, content).with_tags(tag_ids.to_vec()),
            )
            .unwrap()
    }

    pub fn tag(&self, scope: &mut RequestScope<'_>, user: &AuthenticatedUser, name: &str) -> TagId {
        self.tags.create_tag(scope, user, name).unwrap().id
    }
}

pub fn setup() -> (Connection, Services) {
    setup_with_summarizer(Box::new(NoopSummarizer))
}

pub fn setup_with_summarizer(summarizer: Box<dyn Summarizer>) -> (Connection, Services) {
    let config = CoreConfig::with_secret(SECRET);
    let conn = open_db_in_memory(&config.db).unwrap();
    (conn, Services::new(config, summarizer))
}

pub fn light_hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::with_params(1024, 1, 1).unwrap()
}

pub fn register_request(name: &str) -> RegisterRequest {
    RegisterRequest {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        password: PASSWORD.to_string(),
    }
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
