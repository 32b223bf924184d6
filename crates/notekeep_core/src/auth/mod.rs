//! Authentication collaborators.
//!
//! # Responsibility
//! - Define the `PasswordHasher` and `Authenticator` seams consumed by the
//!   account service.
//! - Provide the Argon2 hasher and the HMAC-signed bearer token issuer.
//!
//! # Invariants
//! - `AuthenticatedUser` is only constructed from a verified credential; the
//!   rest of the core trusts its `user_id`.
//! - Plaintext passwords and raw tokens are never logged.

use crate::model::user::UserId;
use serde::Serialize;
use thiserror::Error;

mod password;
mod token;

pub use password::Argon2PasswordHasher;
pub use token::HmacTokenAuthenticator;

pub const TOKEN_TYPE_BEARER: &str = "bearer";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("incorrect email or password")]
    InvalidCredentials,
    /// Token is valid but its subject no longer resolves to a user.
    #[error("could not validate credentials")]
    UnknownUser,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Verified caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Login response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER,
        }
    }
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;
    /// Returns `Ok(false)` on mismatch; `Err` only when `hash` is unusable.
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Bearer token issuance and resolution.
pub trait Authenticator: Send + Sync {
    fn issue_token(&self, user_id: UserId) -> Result<String, AuthError>;
    fn resolve_user(&self, token: &str) -> Result<UserId, AuthError>;
}
