//! PEM normalization for externally supplied RSA key material.
//!
//! # Purpose
//! Rebuild a syntactically valid PEM document from key text whose formatting
//! cannot be trusted: newlines escaped as the two characters `\n` (typical of
//! environment variables), stray whitespace, and missing or mislabeled
//! `-----BEGIN ...-----` delimiters.
//!
//! # Key invariants
//! - Output is `BEGIN <label>`, the base64 body wrapped at 64 columns, and
//!   `END <label>`, joined by single newlines.
//! - Header and footer always carry the same label.
//! - Normalizing an already normalized document returns it unchanged.
//!
//! # Common pitfalls
//! - Label detection is a case-sensitive substring check on the raw text, so a
//!   lowercase `rsa private key` marker is not treated as PKCS#1.
//! - Delimiter stripping matches any all-caps label, not just the expected one.
use crate::{SsoError, SsoResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Width of each base64 body line in the emitted PEM.
pub const PEM_LINE_WIDTH: usize = 64;

const RSA_PRIVATE_MARKER: &str = "RSA PRIVATE KEY";
const RSA_PUBLIC_MARKER: &str = "RSA PUBLIC KEY";

// Whitespace is gone by the time these run, so `[A-Z ]+` only ever sees the
// collapsed label (e.g. `BEGINRSAPRIVATEKEY`).
static BEGIN_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-----BEGIN[A-Z ]+-----").expect("static regex"));
static END_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-----END[A-Z ]+-----").expect("static regex"));

/// Which half of a key pair the caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Public,
    Private,
}

/// PEM type label written into the header and footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PemLabel {
    /// SPKI public key.
    PublicKey,
    /// PKCS#8 private key.
    PrivateKey,
    /// PKCS#1 public key.
    RsaPublicKey,
    /// PKCS#1 private key.
    RsaPrivateKey,
}

impl PemLabel {
    /// Pick the label for `role`, using the legacy PKCS#1 variant when `rsa`.
    pub fn for_role(role: KeyRole, rsa: bool) -> Self {
        match (role, rsa) {
            (KeyRole::Public, false) => PemLabel::PublicKey,
            (KeyRole::Public, true) => PemLabel::RsaPublicKey,
            (KeyRole::Private, false) => PemLabel::PrivateKey,
            (KeyRole::Private, true) => PemLabel::RsaPrivateKey,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PemLabel::PublicKey => "PUBLIC KEY",
            PemLabel::PrivateKey => "PRIVATE KEY",
            PemLabel::RsaPublicKey => "RSA PUBLIC KEY",
            PemLabel::RsaPrivateKey => "RSA PRIVATE KEY",
        }
    }

    pub fn is_pkcs1(&self) -> bool {
        matches!(self, PemLabel::RsaPublicKey | PemLabel::RsaPrivateKey)
    }
}

impl fmt::Display for PemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PEM document produced by [`normalize`] or [`normalize_as`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPem {
    label: PemLabel,
    text: String,
}

impl NormalizedPem {
    pub fn label(&self) -> PemLabel {
        self.label
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for NormalizedPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Whether the raw text declares legacy PKCS#1 encoding anywhere.
pub fn detects_rsa_label(raw: &str) -> bool {
    raw.contains(RSA_PRIVATE_MARKER) || raw.contains(RSA_PUBLIC_MARKER)
}

/// Normalize `raw` for `role`, choosing the label from the raw text.
///
/// # Errors
/// - `SsoError::Configuration` when `raw` is empty or nothing but
///   delimiters and whitespace remain after stripping.
///
/// # Examples
/// ```rust
/// use growth_sso::{KeyRole, PemLabel, normalize};
///
/// let raw = "-----BEGIN PUBLIC KEY-----\\nQUJD\\n-----END PUBLIC KEY-----";
/// let pem = normalize(raw, KeyRole::Public).expect("normalize");
/// assert_eq!(pem.label(), PemLabel::PublicKey);
/// assert_eq!(pem.as_str(), "-----BEGIN PUBLIC KEY-----\nQUJD\n-----END PUBLIC KEY-----");
/// ```
pub fn normalize(raw: &str, role: KeyRole) -> SsoResult<NormalizedPem> {
    let label = PemLabel::for_role(role, detects_rsa_label(raw));
    normalize_as(raw, label)
}

/// Normalize `raw` under an explicit `label`, ignoring what the raw text says.
pub fn normalize_as(raw: &str, label: PemLabel) -> SsoResult<NormalizedPem> {
    if raw.trim().is_empty() {
        return Err(SsoError::Configuration("key material is empty".to_string()));
    }

    let body = dense_body(raw);
    if body.is_empty() {
        return Err(SsoError::Configuration(
            "key material has no body after stripping delimiters".to_string(),
        ));
    }

    let mut text = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);
    text.push_str("-----BEGIN ");
    text.push_str(label.as_str());
    text.push_str("-----\n");
    text.push_str(&wrap_body(&body));
    text.push_str("\n-----END ");
    text.push_str(label.as_str());
    text.push_str("-----");

    Ok(NormalizedPem { label, text })
}

fn dense_body(raw: &str) -> String {
    let dense: String = raw
        .replace("\\n", "")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    let dense = BEGIN_DELIMITER.replace_all(&dense, "");
    END_DELIMITER.replace_all(&dense, "").into_owned()
}

fn wrap_body(body: &str) -> String {
    // Base64 is ASCII, but the raw input is arbitrary; chunk on chars so a
    // stray multi-byte character cannot split a code point.
    let chars: Vec<char> = body.chars().collect();
    chars
        .chunks(PEM_LINE_WIDTH)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
