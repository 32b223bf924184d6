//! Registration, login and token authentication.

use crate::auth::{AccessToken, AuthError, AuthenticatedUser, Authenticator, PasswordHasher};
use crate::db::RequestScope;
use crate::error::CoreResult;
use crate::model::user::{
    normalize_email, normalize_username, validate_password, NewUser, RegisterRequest, UserView,
};
use crate::repo::user_repo::{IdentityStore, SqliteIdentityStore};
use log::{info, warn};

pub struct AccountService {
    hasher: Box<dyn PasswordHasher>,
    authenticator: Box<dyn Authenticator>,
}

impl AccountService {
    pub fn new(hasher: Box<dyn PasswordHasher>, authenticator: Box<dyn Authenticator>) -> Self {
        Self {
            hasher,
            authenticator,
        }
    }

    /// Validates input, hashes the password and stores the user.
    ///
    /// `Conflict` when the username or email is already registered.
    pub fn register(
        &self,
        scope: &mut RequestScope<'_>,
        request: &RegisterRequest,
    ) -> CoreResult<UserView> {
        let username = normalize_username(&request.username)?;
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;
        let password_hash = self.hasher.hash(&request.password)?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
        };
        let user = scope.write("account_register", |tx| {
            SqliteIdentityStore::new(tx).create_user(&new_user)
        })?;
        info!(
            "event=account_register module=service status=ok request_id={} user_id={}",
            scope.request_id(),
            user.id
        );
        Ok(UserView::from(&user))
    }

    /// Checks credentials and issues a bearer token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub fn login(
        &self,
        scope: &mut RequestScope<'_>,
        email: &str,
        password: &str,
    ) -> CoreResult<AccessToken> {
        let email = email.trim().to_lowercase();
        let user = scope.read("account_login", |tx| {
            SqliteIdentityStore::new(tx).find_by_email(&email)
        })?;

        let Some(user) = user else {
            warn!(
                "event=account_login module=service status=rejected request_id={}",
                scope.request_id()
            );
            return Err(AuthError::InvalidCredentials.into());
        };
        if !self.hasher.verify(password, &user.password_hash)? {
            warn!(
                "event=account_login module=service status=rejected request_id={} user_id={}",
                scope.request_id(),
                user.id
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.authenticator.issue_token(user.id)?;
        info!(
            "event=account_login module=service status=ok request_id={} user_id={}",
            scope.request_id(),
            user.id
        );
        Ok(AccessToken::bearer(token))
    }

    /// Resolves a bearer token to a user that still exists.
    pub fn authenticate(
        &self,
        scope: &mut RequestScope<'_>,
        token: &str,
    ) -> CoreResult<AuthenticatedUser> {
        let user_id = self.authenticator.resolve_user(token)?;
        let user = scope.read("account_authenticate", |tx| {
            SqliteIdentityStore::new(tx).get_user(user_id)
        })?;
        match user {
            Some(user) => Ok(AuthenticatedUser::new(user.id)),
            None => Err(AuthError::UnknownUser.into()),
        }
    }

    /// Profile of the authenticated caller.
    pub fn me(&self, scope: &mut RequestScope<'_>, user: &AuthenticatedUser) -> CoreResult<UserView> {
        let found = scope.read("account_me", |tx| {
            SqliteIdentityStore::new(tx).get_user(user.user_id())
        })?;
        found
            .as_ref()
            .map(UserView::from)
            .ok_or_else(|| AuthError::UnknownUser.into())
    }
}
