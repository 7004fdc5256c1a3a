//! RSA key handles built from normalized PEM.
//!
//! # Purpose
//! Turn raw configured key text into immutable key objects that the token
//! module can sign or verify with.
//!
//! # Key invariants
//! - Every handle is parsed from exactly one [`NormalizedPem`] and keeps it.
//! - The PEM label must agree with the body encoding: `RSA ...` labels parse as
//!   PKCS#1, the others as PKCS#8 / SPKI. A mismatch is a construction failure.
//! - Private keys get one retry under a forced `RSA PRIVATE KEY` label; public
//!   keys get none.
use crate::pem::{KeyRole, NormalizedPem, PemLabel, normalize, normalize_as};
use crate::{SsoError, SsoResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Verification key for inbound SSO tokens.
#[derive(Clone)]
pub struct SsoPublicKey {
    pem: NormalizedPem,
    decoding_key: DecodingKey,
}

impl SsoPublicKey {
    /// Parse an already normalized PEM into a verification key.
    ///
    /// # Errors
    /// - `SsoError::KeyFormat` when the body is not a valid key for the label.
    pub fn from_normalized(pem: NormalizedPem) -> SsoResult<Self> {
        let key = match pem.label() {
            PemLabel::RsaPublicKey => RsaPublicKey::from_pkcs1_pem(pem.as_str())
                .map_err(|err| SsoError::KeyFormat(format!("invalid RSA public key: {err}")))?,
            PemLabel::PublicKey => RsaPublicKey::from_public_key_pem(pem.as_str())
                .map_err(|err| SsoError::KeyFormat(format!("invalid public key: {err}")))?,
            other => {
                return Err(SsoError::KeyFormat(format!(
                    "expected a public key, got {other}"
                )));
            }
        };
        let n = URL_SAFE_NO_PAD.encode(key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(key.e().to_bytes_be());
        let decoding_key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|err| SsoError::KeyFormat(format!("invalid public key: {err}")))?;
        Ok(Self { pem, decoding_key })
    }

    pub fn pem(&self) -> &NormalizedPem {
        &self.pem
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl std::fmt::Debug for SsoPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoPublicKey")
            .field("label", &self.pem.label())
            .finish_non_exhaustive()
    }
}

/// Signing key for outbound SSO tokens.
#[derive(Clone)]
pub struct SsoPrivateKey {
    pem: NormalizedPem,
    encoding_key: EncodingKey,
}

impl SsoPrivateKey {
    /// Parse an already normalized PEM into a signing key.
    ///
    /// # Errors
    /// - `SsoError::KeyFormat` when the body is not a valid key for the label.
    pub fn from_normalized(pem: NormalizedPem) -> SsoResult<Self> {
        let key = match pem.label() {
            PemLabel::RsaPrivateKey => RsaPrivateKey::from_pkcs1_pem(pem.as_str())
                .map_err(|err| SsoError::KeyFormat(format!("invalid RSA private key: {err}")))?,
            PemLabel::PrivateKey => RsaPrivateKey::from_pkcs8_pem(pem.as_str())
                .map_err(|err| SsoError::KeyFormat(format!("invalid private key: {err}")))?,
            other => {
                return Err(SsoError::KeyFormat(format!(
                    "expected a private key, got {other}"
                )));
            }
        };
        // ring wants PKCS#1 DER regardless of how the key arrived.
        let der = key
            .to_pkcs1_der()
            .map_err(|err| SsoError::KeyFormat(format!("encode private key: {err}")))?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());
        Ok(Self { pem, encoding_key })
    }

    pub fn pem(&self) -> &NormalizedPem {
        &self.pem
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl std::fmt::Debug for SsoPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoPrivateKey")
            .field("label", &self.pem.label())
            .finish_non_exhaustive()
    }
}

/// Load a verification key from raw configured text.
///
/// # Errors
/// - `SsoError::Configuration` for empty input.
/// - `SsoError::KeyFormat` when the normalized PEM does not parse.
pub fn load_public_key(raw: &str) -> SsoResult<SsoPublicKey> {
    SsoPublicKey::from_normalized(normalize(raw, KeyRole::Public)?)
}

/// Load a signing key from raw configured text.
///
/// The first attempt uses the label detected from the raw text. If that key
/// does not parse, the body is retried once as `RSA PRIVATE KEY`. When both
/// attempts fail the first attempt's error is returned, since it reflects the
/// configured format.
///
/// # Errors
/// - `SsoError::Configuration` for empty input.
/// - `SsoError::KeyFormat` from the first attempt when both attempts fail.
pub fn load_private_key(raw: &str) -> SsoResult<SsoPrivateKey> {
    let first = normalize(raw, KeyRole::Private).and_then(SsoPrivateKey::from_normalized);
    let first_err = match first {
        Ok(key) => return Ok(key),
        Err(err @ SsoError::Configuration(_)) => return Err(err),
        Err(err) => err,
    };

    tracing::debug!(error = %first_err, "private key rejected, retrying as RSA PRIVATE KEY");
    match normalize_as(raw, PemLabel::RsaPrivateKey).and_then(SsoPrivateKey::from_normalized) {
        Ok(key) => Ok(key),
        Err(_) => Err(first_err),
    }
}
