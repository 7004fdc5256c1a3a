//! Tracker HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::session::SessionKeys;
use crate::notify::Notifier;
use crate::store::TrackerStore;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use growth_sso::SsoAuthority;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TrackerStore + Send + Sync>,
    pub sessions: SessionKeys,
    pub sso: SsoAuthority,
    pub notifier: Notifier,
    pub dev_endpoints: bool,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/api/health", get(api::system::health))
        .route("/api/auth/register", post(auth::local::register))
        .route("/api/auth/login", post(auth::local::login))
        .route("/api/auth/sso", post(auth::sso::sso_login))
        .route("/api/dev/sso-token", post(auth::sso::dev_sso_token))
        .route(
            "/api/leads",
            get(api::leads::list_leads).post(api::leads::create_lead),
        )
        .route("/api/leads/summary", get(api::leads::lead_summary))
        .route("/api/leads/:id", put(api::leads::update_lead))
        .route("/api/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
