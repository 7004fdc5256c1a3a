//! Configured SSO key pair with lazy key loading.
//!
//! # Purpose
//! Holds the raw public/private key strings exactly as they arrived from
//! process configuration and exposes the two SSO entry points: verifying an
//! inbound token and issuing an outbound one.
//!
//! # Key invariants
//! - Raw key text is only normalized and parsed when an entry point runs, so a
//!   missing or broken key surfaces as an error on first use rather than at
//!   startup.
//! - Nothing is cached between calls; each call is independent.
use crate::keys::{load_private_key, load_public_key};
use crate::token::{IdentityClaims, issue_sso_token, verify_sso_token};
use crate::{SsoError, SsoResult};

pub const PUBLIC_KEY_VAR: &str = "SSO_PUBLIC_KEY";
pub const PRIVATE_KEY_VAR: &str = "SSO_PRIVATE_KEY";

#[derive(Clone, Default)]
pub struct SsoAuthority {
    public_key: Option<String>,
    private_key: Option<String>,
}

impl SsoAuthority {
    pub fn new(public_key: Option<String>, private_key: Option<String>) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn has_public_key(&self) -> bool {
        configured(self.public_key.as_deref()).is_some()
    }

    pub fn has_private_key(&self) -> bool {
        configured(self.private_key.as_deref()).is_some()
    }

    /// Verify an inbound SSO token against the configured public key.
    ///
    /// # Errors
    /// - `SsoError::Configuration` when no public key is configured.
    /// - `SsoError::KeyFormat` when the configured key does not parse.
    /// - `SsoError::CryptoVerification` / `SsoError::Validation` from
    ///   [`verify_sso_token`].
    pub fn verify(&self, token: &str) -> SsoResult<IdentityClaims> {
        let raw = configured(self.public_key.as_deref())
            .ok_or_else(|| SsoError::Configuration(format!("{PUBLIC_KEY_VAR} not configured")))?;
        let key = load_public_key(raw)?;
        verify_sso_token(token, &key)
    }

    /// Mint an RS256 SSO token for `email` using the configured private key.
    ///
    /// # Errors
    /// - `SsoError::Configuration` when no private key is configured.
    /// - `SsoError::KeyFormat` when neither the detected nor the forced
    ///   `RSA PRIVATE KEY` label parses.
    pub fn issue(&self, email: &str, name: Option<&str>) -> SsoResult<String> {
        let raw = configured(self.private_key.as_deref())
            .ok_or_else(|| SsoError::Configuration(format!("{PRIVATE_KEY_VAR} not configured")))?;
        let key = load_private_key(raw)?;
        issue_sso_token(&key, email, name)
    }
}

impl std::fmt::Debug for SsoAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoAuthority")
            .field("public_key", &self.has_public_key())
            .field("private_key", &self.has_private_key())
            .finish()
    }
}

fn configured(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.is_empty())
}
