mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestApp;
use growth_sso::SsoAuthority;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn health_reports_running() {
    let app = TestApp::new(SsoAuthority::default());
    let (status, body) = app.send(get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Growth Tracker API is running");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new(SsoAuthority::default());
    let (status, body) = app.send(get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/auth/sso"].is_object());
    assert!(body["paths"]["/api/leads/summary"].is_object());
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let app = TestApp::new(SsoAuthority::default());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/leads")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .expect("request");
    let response = tower::ServiceExt::oneshot(
        tracker::app::build_router(app.state.clone()),
        request,
    )
    .await
    .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
