use thiserror::Error;

/// Failures produced while normalizing key material or handling SSO tokens.
///
/// The variants separate operator-fixable problems (`Configuration`) from
/// malformed keys, rejected signatures, and verified tokens that lack a
/// required claim. Callers at the HTTP boundary collapse all of them into a
/// single message, so the `Display` text is the only detail that leaves the
/// process.
#[derive(Debug, Error)]
pub enum SsoError {
    /// Key material is missing or empty.
    #[error("{0}")]
    Configuration(String),
    /// Normalized PEM could not be parsed into an RSA key of the declared type.
    #[error("{0}")]
    KeyFormat(String),
    /// Signature, algorithm, expiry, or structure check failed.
    #[error("{0}")]
    CryptoVerification(#[from] jsonwebtoken::errors::Error),
    /// Token verified but a required claim is absent.
    #[error("{0}")]
    Validation(String),
}

pub type SsoResult<T> = Result<T, SsoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_bare_detail() {
        let errors = vec![
            SsoError::Configuration("SSO_PUBLIC_KEY not configured".to_string()),
            SsoError::KeyFormat("unsupported key".to_string()),
            SsoError::CryptoVerification(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSignature,
            )),
            SsoError::Validation("missing email".to_string()),
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
        assert_eq!(
            SsoError::Validation("missing email".to_string()).to_string(),
            "missing email"
        );
    }
}
