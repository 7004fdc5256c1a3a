//! OpenAPI schema aggregation for the tracker API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document served
//! at `/api/openapi.json`.
use crate::api::types::{
    AuthResponse, DevTokenRequest, DevTokenResponse, ErrorResponse, HealthStatus, LoginRequest,
    RegisterRequest, SsoLoginRequest,
};
use crate::api::{leads, system};
use crate::auth::{local, sso};
use crate::model::{ClientValue, Lead, LeadInput, LeadSummary, UserProfile};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "growth-tracker",
        version = "v1",
        description = "Growth Tracker sales lead API"
    ),
    paths(
        system::health,
        local::register,
        local::login,
        sso::sso_login,
        sso::dev_sso_token,
        leads::list_leads,
        leads::create_lead,
        leads::update_lead,
        leads::lead_summary
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        SsoLoginRequest,
        DevTokenRequest,
        DevTokenResponse,
        UserProfile,
        Lead,
        LeadInput,
        LeadSummary,
        ClientValue
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "system", description = "Service health"),
        (name = "auth", description = "Local accounts and SSO sign-in"),
        (name = "dev", description = "Development helpers"),
        (name = "leads", description = "Sales leads")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/health",
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/sso",
            "/api/dev/sso-token",
            "/api/leads",
            "/api/leads/{id}",
            "/api/leads/summary",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
