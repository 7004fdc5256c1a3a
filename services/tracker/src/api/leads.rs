//! Lead API handlers.
//!
//! # Purpose
//! Lists, creates, and updates the caller's sales leads and computes the
//! dashboard summary. Every route requires an authenticated [`AuthUser`].
//!
//! # Key invariants
//! - A caller only ever sees or modifies leads it owns; updating another
//!   owner's lead is a 403, a missing lead a 404.
//! - Notifications fire on create and only on an actual status change.
use crate::api::error::{ApiError, api_forbidden, api_internal, api_not_found};
use crate::app::AppState;
use crate::auth::extractor::AuthUser;
use crate::model::{Lead, LeadInput, LeadSummary};
use crate::notify::{NEW_LEAD_ACTION, status_changed_action};
use crate::observability::{LEAD_STATUS_CHANGES_TOTAL, LEADS_CREATED_TOTAL};
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

const DATABASE_ERROR: &str = "Database error";

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's leads, newest first", body = [Lead]),
        (status = 401, description = "Missing bearer token", body = crate::api::types::ErrorResponse),
        (status = 403, description = "Invalid session token", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_leads(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Lead>>, ApiError> {
    let leads = state
        .store
        .list_leads(user.id)
        .await
        .map_err(|err| api_internal(DATABASE_ERROR, &err))?;
    Ok(Json(leads))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    security(("bearer" = [])),
    request_body = LeadInput,
    responses(
        (status = 201, description = "Lead created", body = Lead)
    )
)]
pub(crate) async fn create_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<LeadInput>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let lead = state
        .store
        .create_lead(user.id, body)
        .await
        .map_err(|err| api_internal(DATABASE_ERROR, &err))?;
    tracing::info!(
        lead_id = lead.id,
        client = %lead.client,
        title = %lead.title,
        user_id = user.id,
        "lead created"
    );
    metrics::counter!(LEADS_CREATED_TOTAL).increment(1);
    state.notifier.lead_event(&lead, NEW_LEAD_ACTION);
    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "leads",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Lead id")),
    request_body = LeadInput,
    responses(
        (status = 200, description = "Lead updated", body = Lead),
        (status = 403, description = "Lead owned by another user", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Lead not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_lead(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<LeadInput>,
) -> Result<Json<Lead>, ApiError> {
    let existing = match state.store.get_lead(id).await {
        Ok(lead) => lead,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("Lead not found")),
        Err(err) => return Err(api_internal(DATABASE_ERROR, &err)),
    };
    if existing.user_id != user.id {
        return Err(api_forbidden("Unauthorized"));
    }

    let updated = match state.store.update_lead(id, body).await {
        Ok(lead) => lead,
        Err(StoreError::NotFound(_)) => return Err(api_not_found("Lead not found")),
        Err(err) => return Err(api_internal(DATABASE_ERROR, &err)),
    };
    tracing::info!(lead_id = updated.id, status = %updated.status, "lead updated");

    if existing.status != updated.status {
        metrics::counter!(LEAD_STATUS_CHANGES_TOTAL).increment(1);
        state
            .notifier
            .lead_event(&updated, &status_changed_action(&updated.status));
    }
    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/leads/summary",
    tag = "leads",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Pipeline statistics for the caller", body = LeadSummary)
    )
)]
pub(crate) async fn lead_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<LeadSummary>, ApiError> {
    let leads = state
        .store
        .list_leads(user.id)
        .await
        .map_err(|err| api_internal(DATABASE_ERROR, &err))?;
    Ok(Json(LeadSummary::from_leads(&leads)))
}
