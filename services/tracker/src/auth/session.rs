//! HS256 session tokens for authenticated API calls.
//!
//! # Key invariants
//! - Claims are `{id, name, iat}`; tokens carry no expiry and stay valid until
//!   `JWT_SECRET` changes.
//! - Verification accepts HS256 only.
use crate::model::User;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, SessionError> {
        let claims = SessionClaims {
            id: user.id,
            name: user.name.clone(),
            iat: now_epoch_seconds(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 42,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn issued_session_round_trips() {
        let keys = SessionKeys::from_secret("secret");
        let token = keys.issue(&user()).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.name, "Ada");
    }

    #[test]
    fn session_from_other_secret_is_rejected() {
        let token = SessionKeys::from_secret("one").issue(&user()).expect("issue");
        assert!(SessionKeys::from_secret("two").verify(&token).is_err());
    }

    #[test]
    fn session_without_exp_never_expires() {
        let keys = SessionKeys::from_secret("secret");
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "id": 1, "name": "Old", "iat": 1 }),
            &EncodingKey::from_secret(b"secret"),
        )
        .expect("token");
        assert_eq!(keys.verify(&token).expect("verify").name, "Old");
    }

    #[test]
    fn non_hs256_session_is_rejected() {
        let keys = SessionKeys::from_secret("secret");
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &serde_json::json!({ "id": 1, "name": "x" }),
            &EncodingKey::from_secret(b"secret"),
        )
        .expect("token");
        assert!(keys.verify(&token).is_err());
    }
}
