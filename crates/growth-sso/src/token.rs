//! RS256 SSO token verification and issuance.
//!
//! # Key invariants
//! - The validation algorithm list is exactly `[RS256]`. Tokens declaring any
//!   other `alg` (HS256, ES256, `none`) are rejected before signature checks.
//! - `exp` and `nbf` are enforced when present (no leeway) but are not
//!   required, matching what external issuers are allowed to send. A present
//!   time claim that is not a JSON number is rejected rather than skipped.
//! - Issuer and audience claims are ignored; the payload is an unstructured
//!   map and only `email` / `name` are read.
use crate::keys::{SsoPrivateKey, SsoPublicKey};
use crate::{SsoError, SsoResult};
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Lifetime of tokens minted by [`issue_sso_token`].
pub const SSO_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Identity extracted from a verified SSO token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    iat: i64,
    exp: i64,
}

fn sso_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = vec![Algorithm::RS256];
    validation.required_spec_claims.clear();
    validation.validate_aud = false;
    validation.validate_nbf = true;
    validation.leeway = 0;
    validation
}

/// Verify an inbound RS256 token and extract its identity claims.
///
/// # Errors
/// - `SsoError::CryptoVerification` for malformed tokens, non-RS256 headers,
///   signature mismatches, and expired or not-yet-valid tokens.
/// - `SsoError::Validation` when `exp` / `nbf` is present but not numeric, or
///   the verified payload has no usable `email`.
pub fn verify_sso_token(token: &str, key: &SsoPublicKey) -> SsoResult<IdentityClaims> {
    let data =
        jsonwebtoken::decode::<Map<String, Value>>(token, key.decoding_key(), &sso_validation())?;
    check_time_claims(&data.claims)?;
    identity_from_claims(&data.claims)
}

// jsonwebtoken skips its time checks for optional claims it cannot parse.
fn check_time_claims(claims: &Map<String, Value>) -> SsoResult<()> {
    for claim in ["exp", "nbf"] {
        if let Some(value) = claims.get(claim)
            && !value.is_number()
        {
            return Err(SsoError::Validation(format!("invalid {claim} value")));
        }
    }
    Ok(())
}

fn identity_from_claims(claims: &Map<String, Value>) -> SsoResult<IdentityClaims> {
    let email = claims
        .get("email")
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SsoError::Validation("missing email".to_string()))?;
    let name = claims
        .get("name")
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    Ok(IdentityClaims {
        email: email.to_string(),
        name,
    })
}

/// Sign `{email, name}` with RS256 and a fixed one hour expiry.
///
/// # Errors
/// - `SsoError::CryptoVerification` if signing fails inside `jsonwebtoken`.
pub fn issue_sso_token(key: &SsoPrivateKey, email: &str, name: Option<&str>) -> SsoResult<String> {
    let now = now_epoch_seconds();
    let claims = IssuedClaims {
        email,
        name,
        iat: now,
        exp: now + SSO_TOKEN_TTL.as_secs() as i64,
    };
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        key.encoding_key(),
    )?)
}

fn now_epoch_seconds() -> i64 {
    // A clock before the epoch clamps to zero rather than panicking.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
