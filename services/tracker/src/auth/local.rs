//! Email/password registration and login.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_unauthorized,
};
use crate::api::types::{AuthResponse, LoginRequest, RegisterRequest};
use crate::app::AppState;
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::model::{NewUser, UserProfile};
use crate::store::StoreError;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 409, description = "Email already registered", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Registration failed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let password_hash = hash_password_blocking(body.password).await.map_err(|err| {
        tracing::error!(error = %err, "password hashing failed");
        api_internal_message("Error registering user")
    })?;
    let new_user = NewUser {
        name: body.name,
        email: body.email,
        password_hash,
    };
    match state.store.create_user(new_user).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "user registered");
            Ok((StatusCode::CREATED, Json(user.profile())))
        }
        Err(StoreError::Conflict(_)) => Err(api_conflict("Email already registered")),
        Err(err) => Err(api_internal("Error registering user", &err)),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .store
        .find_user_by_email(&body.email)
        .await
        .map_err(|err| api_internal("Error logging in", &err))?
        .ok_or_else(|| api_unauthorized(INVALID_CREDENTIALS))?;

    let matches = verify_password_blocking(body.password, user.password_hash.clone())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "password verification failed");
            api_internal_message("Error logging in")
        })?;
    if !matches {
        return Err(api_unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.sessions.issue(&user).map_err(|err| {
        tracing::error!(error = %err, "session token signing failed");
        api_internal_message("Error logging in")
    })?;
    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}
