//! SSO sign-in and the development token endpoint.
//!
//! # Purpose
//! Exchanges an RS256 token from the external identity provider for a local
//! session, provisioning the principal on first sign-in.
//!
//! # Key invariants
//! - Every failure, whatever its cause, is a 401 whose message starts with
//!   `Invalid SSO token: `.
//! - One principal per email. When a concurrent first sign-in wins the insert,
//!   the loser re-reads the stored principal and reports it as existing.
//!
//! # Security considerations
//! - Store failures are logged and reported with a generic detail; only key,
//!   signature, and claim errors are echoed to the caller.
use crate::api::error::{ApiError, api_internal_message, api_not_found, api_unauthorized};
use crate::api::types::{AuthResponse, DevTokenRequest, DevTokenResponse, SsoLoginRequest};
use crate::app::AppState;
use crate::auth::password::{PasswordError, placeholder_password_hash_blocking};
use crate::auth::session::SessionError;
use crate::model::{NewUser, User};
use crate::observability::SSO_LOGINS_TOTAL;
use crate::store::{StoreError, TrackerStore};
use axum::Json;
use axum::extract::State;
use growth_sso::{IdentityClaims, SsoError};
use thiserror::Error;

pub const SSO_ERROR_PREFIX: &str = "Invalid SSO token: ";
pub const DEV_TOKEN_ERROR_PREFIX: &str = "Error generating token: ";

#[derive(Debug, Error)]
pub enum SsoSignInError {
    #[error(transparent)]
    Sso(#[from] SsoError),
    #[error("user provisioning failed")]
    Store(#[from] StoreError),
    #[error("user provisioning failed")]
    Password(#[from] PasswordError),
    #[error("session token: {0}")]
    Session(#[from] SessionError),
}

/// Outcome of a successful SSO sign-in.
#[derive(Debug, Clone)]
pub struct SsoSignIn {
    pub user: User,
    /// `true` when this sign-in created the principal.
    pub is_new: bool,
    pub session_token: String,
}

/// Verify `token`, load or provision its principal, and mint a session token.
pub async fn sign_in_with_sso(
    state: &AppState,
    token: &str,
) -> Result<SsoSignIn, SsoSignInError> {
    let identity = state.sso.verify(token)?;
    let (user, is_new) = find_or_provision(state.store.as_ref(), &identity).await?;
    let session_token = state.sessions.issue(&user)?;
    Ok(SsoSignIn {
        user,
        is_new,
        session_token,
    })
}

async fn find_or_provision(
    store: &dyn TrackerStore,
    identity: &IdentityClaims,
) -> Result<(User, bool), SsoSignInError> {
    if let Some(user) = store.find_user_by_email(&identity.email).await? {
        return Ok((user, false));
    }

    let name = identity
        .name
        .clone()
        .unwrap_or_else(|| default_display_name(&identity.email));
    let password_hash = placeholder_password_hash_blocking().await?;
    let new_user = NewUser {
        name,
        email: identity.email.clone(),
        password_hash,
    };
    match store.create_user(new_user).await {
        Ok(user) => Ok((user, true)),
        Err(StoreError::Conflict(detail)) => {
            tracing::debug!(
                email = %identity.email,
                "concurrent SSO provisioning, re-reading principal"
            );
            match store.find_user_by_email(&identity.email).await? {
                Some(user) => Ok((user, false)),
                None => Err(StoreError::Conflict(detail).into()),
            }
        }
        Err(err) => Err(err.into()),
    }
}

/// Local part of an email address; the whole input when there is no `@`.
fn default_display_name(email: &str) -> String {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .unwrap_or(email)
        .to_string()
}

#[utoipa::path(
    post,
    path = "/api/auth/sso",
    tag = "auth",
    request_body = SsoLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Token rejected", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn sso_login(
    State(state): State<AppState>,
    Json(body): Json<SsoLoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    match sign_in_with_sso(&state, &body.token).await {
        Ok(sign_in) => {
            let outcome = if sign_in.is_new {
                "provisioned"
            } else {
                "returning"
            };
            metrics::counter!(SSO_LOGINS_TOTAL, "outcome" => outcome).increment(1);
            tracing::info!(
                email = %sign_in.user.email,
                user_id = sign_in.user.id,
                is_new = sign_in.is_new,
                "sso sign-in"
            );
            Ok(Json(AuthResponse {
                token: sign_in.session_token,
                user: sign_in.user.profile(),
            }))
        }
        Err(err) => {
            metrics::counter!(SSO_LOGINS_TOTAL, "outcome" => "rejected").increment(1);
            tracing::warn!(error = ?err, "sso sign-in rejected");
            Err(api_unauthorized(&format!("{SSO_ERROR_PREFIX}{err}")))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/dev/sso-token",
    tag = "dev",
    request_body = DevTokenRequest,
    responses(
        (status = 200, description = "Signed SSO token", body = DevTokenResponse),
        (status = 404, description = "Development endpoints disabled", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Signing failed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn dev_sso_token(
    State(state): State<AppState>,
    Json(body): Json<DevTokenRequest>,
) -> Result<Json<DevTokenResponse>, ApiError> {
    if !state.dev_endpoints {
        return Err(api_not_found("Not found"));
    }
    match state.sso.issue(&body.email, body.name.as_deref()) {
        Ok(token) => Ok(Json(DevTokenResponse { token })),
        Err(err) => {
            tracing::error!(error = %err, "sso token generation failed");
            Err(api_internal_message(&format!("{DEV_TOKEN_ERROR_PREFIX}{err}")))
        }
    }
}
