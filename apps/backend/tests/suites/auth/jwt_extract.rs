// Integration tests for bearer extraction and validation on protected routes.

use std::time::Duration;

use actix_web::test;
use copro_backend::auth::rights::ACTIVE_COPRO;
use copro_backend::state::app_state::AppState;
use copro_backend::state::security_config::SecurityConfig;

use crate::common::assert_error_response;
use crate::support::auth::{bearer_header, issue_aged_token};
use crate::support::create_test_app;

const FIFTEEN_DAYS: Duration = Duration::from_secs(15 * 24 * 60 * 60);

#[actix_web::test]
async fn test_missing_header() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Missing or malformed Bearer token").await;
}

#[actix_web::test]
async fn test_malformed_headers() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    for header in ["Token abc", "Bearer", "bearer abc", "Bearer a b", "Basic dXNlcjpwdw=="] {
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_error_response(resp, 401, "Missing or malformed Bearer token").await;
    }
}

#[actix_web::test]
async fn test_garbage_token() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Invalid token").await;
}

#[actix_web::test]
async fn test_token_signed_with_other_secret() {
    let state = AppState::for_tests();
    let foreign = AppState::for_tests_with_security(SecurityConfig::new(
        "another_secret_key_that_is_long_enough".as_bytes(),
    ));
    let header = bearer_header(&foreign, 7, ACTIVE_COPRO);
    // Same user is logged in on the real side; the signature still decides.
    state.registry.add(7);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Invalid token").await;
}

#[actix_web::test]
async fn test_unregistered_user_is_rejected() {
    let state = AppState::for_tests();
    let header = bearer_header(&state, 7, ACTIVE_COPRO);
    state.registry.remove(7);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Invalid token").await;
}

#[actix_web::test]
async fn test_valid_token_exposes_current_user() {
    let state = AppState::for_tests();
    let header = bearer_header(&state, 42, ACTIVE_COPRO);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    assert!(resp.headers().get("Authorization").is_none());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], 42);
    assert_eq!(body["rights"], ACTIVE_COPRO);
    assert_eq!(
        body["expires_at"].as_i64().unwrap() - body["issued_at"].as_i64().unwrap(),
        30
    );
}

#[actix_web::test]
async fn test_hard_expired_token() {
    let state = AppState::for_tests();
    let token = issue_aged_token(
        &state,
        7,
        ACTIVE_COPRO,
        FIFTEEN_DAYS + Duration::from_secs(24 * 60 * 60),
    );
    assert!(state.registry.contains(7));

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.headers().get("Authorization").is_none());
    assert_error_response(resp, 401, "Token expired, please log in again").await;
}

#[actix_web::test]
async fn test_shorter_hard_expiry_is_honoured() {
    let security = SecurityConfig::for_tests().with_hard_expiry(Duration::from_secs(60));
    let state = AppState::for_tests_with_security(security);
    let token = issue_aged_token(&state, 7, ACTIVE_COPRO, Duration::from_secs(120));

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Token expired, please log in again").await;
}

#[actix_web::test]
async fn test_public_routes_ignore_authorization() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("Authorization", "Bearer garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn test_rejection_carries_the_request_trace_id() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get().uri("/api/admin/sessions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present");
    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header should be present");

    assert_ne!(trace_id, "unknown");
    assert_eq!(trace_id, request_id);
}
