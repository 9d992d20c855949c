mod common;

use std::sync::Arc;

use axum::body::Body;
use backend::engine::{EngineError, EngineResponse};
use common::*;
use http::{
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        CONTENT_TYPE, LOCATION,
    },
    Request, StatusCode,
};
use http_body_util::BodyExt;
use serde_json::json;

fn options_request(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header("Origin", SITE_URL)
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_preflight_returns_cors_headers_without_delegating() {
    let engine = Arc::new(StaticEngine::new(
        EngineResponse::json(StatusCode::OK, &json!({})).unwrap(),
    ));
    let context = TestSetup::with_engine(engine.clone());

    let response = context
        .send(options_request(
            "/api/auth/session?x=1",
            Body::from("ignored body"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], SITE_URL);
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
    assert_eq!(
        headers[ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
    assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "86400");
    assert_eq!(engine.calls(), 0);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_preflight_on_base_path_itself() {
    let engine = Arc::new(StaticEngine::new(
        EngineResponse::json(StatusCode::OK, &json!({})).unwrap(),
    ));
    let context = TestSetup::with_engine(engine.clone());

    let response = context.send(options_request("/api/auth", Body::empty())).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_success_wraps_engine_response() {
    let engine = Arc::new(StaticEngine::new(
        EngineResponse::json(StatusCode::OK, &json!({ "csrfToken": "abc" })).unwrap(),
    ));
    let context = TestSetup::with_engine(engine.clone());

    let response = context
        .send_get_request("/api/auth/csrf", &BrowserCookies::default())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], SITE_URL);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(engine.calls(), 1);

    let body = parse_response_body(response).await;
    assert_eq!(body, json!({ "csrfToken": "abc" }));
}

#[tokio::test]
async fn test_engine_status_is_forwarded() {
    let engine = Arc::new(StaticEngine::new(EngineResponse::redirect(
        "http://localhost:5173/welcome",
    )));
    let context = TestSetup::with_engine(engine);

    let response = context
        .send_get_request(
            "/api/auth/callback/worldcoin?code=c&state=s",
            &BrowserCookies::default(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[LOCATION],
        "http://localhost:5173/welcome"
    );
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], SITE_URL);
}

#[tokio::test]
async fn test_engine_error_becomes_500_envelope() {
    let context = TestSetup::with_engine(Arc::new(FailingEngine(|| EngineError::StateMismatch)));

    let response = context
        .send_get_request("/api/auth/session", &BrowserCookies::default())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], SITE_URL);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

    let body = parse_response_body(response).await;
    assert_eq!(
        body,
        json!({ "error": "Internal Server Error", "details": "OAuth state mismatch" })
    );
}

#[tokio::test]
async fn test_engine_panic_becomes_500_envelope() {
    let context = TestSetup::with_engine(Arc::new(PanickingEngine {
        message: Some("engine exploded"),
    }));

    let response = context
        .send_form_request("/api/auth/signout", &[], &BrowserCookies::default())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(body["details"], "engine exploded");
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_panic_without_message_reports_unknown_error() {
    let context = TestSetup::with_engine(Arc::new(PanickingEngine { message: None }));

    let response = context
        .send_get_request("/api/auth/session", &BrowserCookies::default())
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["details"], "Unknown error");
}

#[tokio::test]
async fn test_health_endpoint() {
    let context = TestSetup::with_engine(Arc::new(FailingEngine(|| EngineError::MissingCode)));

    let response = context
        .send_get_request("/health", &BrowserCookies::default())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["semver"], env!("CARGO_PKG_VERSION"));
}
