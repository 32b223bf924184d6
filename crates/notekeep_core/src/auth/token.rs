//! HMAC-SHA256 signed bearer tokens.
//!
//! Token layout: `base64url(claims_json) "." base64url(hmac_sha256(payload))`
//! where `payload` is the first (encoded) segment and claims are
//! `{"sub": "<user id>", "exp": <unix seconds>}`.

use super::{AuthError, Authenticator};
use crate::config::AuthConfig;
use crate::model::user::UserId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

pub struct HmacTokenAuthenticator {
    secret: Vec<u8>,
    ttl: chrono::Duration,
}

impl HmacTokenAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.secret_key.as_bytes().to_vec(),
            ttl: config.access_token_ttl,
        }
    }

    /// Issues a token as of `now`.
    pub fn issue_token_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.ttl).timestamp(),
        };
        let json =
            serde_json::to_vec(&claims).map_err(|err| AuthError::Hashing(err.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes())?);
        Ok(format!("{payload}.{signature}"))
    }

    /// Resolves a token as of `now`.
    pub fn resolve_user_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(|_| AuthError::InvalidToken)?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }
        claims.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|err| AuthError::Hashing(err.to_string()))
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl Authenticator for HmacTokenAuthenticator {
    fn issue_token(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue_token_at(user_id, Utc::now())
    }

    fn resolve_user(&self, token: &str) -> Result<UserId, AuthError> {
        self.resolve_user_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::HmacTokenAuthenticator;
    use crate::auth::{AuthError, Authenticator};
    use crate::config::AuthConfig;
    use chrono::{Duration, TimeZone, Utc};

    fn authenticator(secret: &str) -> HmacTokenAuthenticator {
        HmacTokenAuthenticator::new(&AuthConfig::new(secret))
    }

    #[test]
    fn issued_token_resolves_to_subject() {
        let auth = authenticator("secret");
        let token = auth.issue_token(42).unwrap();
        assert_eq!(auth.resolve_user(&token).unwrap(), 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = authenticator("secret");
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = auth.issue_token_at(7, issued_at).unwrap();

        assert_eq!(
            auth.resolve_user_at(&token, issued_at + Duration::minutes(29)),
            Ok(7)
        );
        assert_eq!(
            auth.resolve_user_at(&token, issued_at + Duration::minutes(30)),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = authenticator("one").issue_token(1).unwrap();
        assert_eq!(
            authenticator("two").resolve_user(&token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let auth = authenticator("secret");
        let token = auth.issue_token(1).unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{}.{signature}", auth.issue_token(2).unwrap().split_once('.').unwrap().0);
        assert_ne!(forged, token);
        assert_eq!(auth.resolve_user(&forged), Err(AuthError::InvalidToken));
    }

    #[test]
    fn blank_and_malformed_tokens() {
        let auth = authenticator("secret");
        assert_eq!(auth.resolve_user("  "), Err(AuthError::MissingCredential));
        assert_eq!(auth.resolve_user("no-dot"), Err(AuthError::InvalidToken));
        assert_eq!(auth.resolve_user("a.!!"), Err(AuthError::InvalidToken));
    }
}
