// Integration tests for logout and the full session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use actix_web::test;
use copro_backend::auth::rights::ACTIVE_COPRO;
use copro_backend::services::credentials::StaticCredentials;
use copro_backend::state::app_state::AppState;
use serde_json::json;

use crate::common::assert_error_response;
use crate::support::auth::{bearer_header, issue_aged_token};
use crate::support::create_test_app;

#[actix_web::test]
async fn test_logout_invalidates_token() {
    let state = AppState::for_tests();
    let header = bearer_header(&state, 7, ACTIVE_COPRO);

    let app = create_test_app(state.clone()).with_prod_routes().build().await;
    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", header.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);
    assert!(!state.registry.contains(7));

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_error_response(resp, 401, "Invalid token").await;
}

#[actix_web::test]
async fn test_logout_revokes_every_token_of_the_user() {
    let state = AppState::for_tests();
    let first = bearer_header(&state, 7, ACTIVE_COPRO);
    let second = bearer_header(&state, 7, ACTIVE_COPRO);
    let other = bearer_header(&state, 8, ACTIVE_COPRO);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", first))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 204);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", second))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_error_response(resp, 401, "Invalid token").await;

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", other))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);
}

#[actix_web::test]
async fn test_logout_requires_token() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Missing or malformed Bearer token").await;
}

#[actix_web::test]
async fn test_logout_with_soft_expired_token() {
    let state = AppState::for_tests();
    let token = issue_aged_token(&state, 7, ACTIVE_COPRO, Duration::from_secs(40));

    let app = create_test_app(state.clone()).with_prod_routes().build().await;
    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 204);
    assert!(!state.registry.contains(7));
}

#[actix_web::test]
async fn test_login_after_logout_starts_new_session() {
    let credentials = StaticCredentials::default().with_user("syndic", "pw", 7, ACTIVE_COPRO);
    let state = AppState::for_tests().with_credentials(Arc::new(credentials));
    let app = create_test_app(state.clone()).with_prod_routes().build().await;

    let login = || {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "login": "syndic", "password": "pw" }))
            .to_request()
    };

    let body: serde_json::Value = test::call_and_read_body_json(&app, login()).await;
    let old = format!("Bearer {}", body["token"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(("Authorization", old.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 204);

    let body: serde_json::Value = test::call_and_read_body_json(&app, login()).await;
    let new = format!("Bearer {}", body["token"].as_str().unwrap());
    assert!(state.registry.contains(7));

    // Re-registering the user revives older tokens that are still within their lifetime.
    for header in [new, old] {
        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", header))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);
    }
}
