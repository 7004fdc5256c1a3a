//! Bearer-token guard for protected routes.
//!
//! A request without `Authorization: Bearer <token>` is rejected with 401; a
//! token that fails session verification is rejected with 403.
use crate::api::error::{ApiError, api_forbidden, api_unauthorized};
use crate::app::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated caller, taken from verified session claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| api_unauthorized("missing bearer token"))?;
        let claims = state.sessions.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "session token rejected");
            api_forbidden("invalid session token")
        })?;
        Ok(AuthUser {
            id: claims.id,
            name: claims.name,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
