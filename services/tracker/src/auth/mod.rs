//! Authentication for the tracker API.
//!
//! # Purpose
//! Local password accounts, SSO sign-in backed by `growth-sso`, HS256 session
//! tokens, and the [`extractor::AuthUser`] guard used by lead routes.
pub mod extractor;
pub mod local;
pub mod password;
pub mod session;
pub mod sso;
