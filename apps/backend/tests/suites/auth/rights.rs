// Integration tests for RightHandler gates on route groups.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::{test, web, HttpResponse};
use copro_backend::auth::rights::{
    self, RightHandler, ACTIVE, ACTIVE_ADMIN, ACTIVE_COPRO, ACTIVE_HOUSING, ADMIN, COPRO,
};
use copro_backend::middleware::jwt_extract::JwtExtract;
use copro_backend::middleware::require_rights::RequireRights;
use copro_backend::state::app_state::AppState;

use crate::common::assert_error_response;
use crate::support::auth::bearer_header;
use crate::support::create_test_app;

#[actix_web::test]
async fn test_admin_routes_reject_copro_user() {
    let state = AppState::for_tests();
    let header = bearer_header(&state, 5, ACTIVE_COPRO);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/admin/sessions")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Admin rights required").await;
}

#[actix_web::test]
async fn test_admin_routes_reject_inactive_admin() {
    let state = AppState::for_tests();
    let header = bearer_header(&state, 5, ADMIN);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/admin/sessions")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Admin rights required").await;
}

#[actix_web::test]
async fn test_admin_routes_allow_admin() {
    let state = AppState::for_tests();
    let header = bearer_header(&state, 1, ACTIVE_ADMIN);
    state.registry.add(2);
    state.registry.add(3);

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get()
        .uri("/api/admin/sessions")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["active_sessions"], 3);
}

#[actix_web::test]
async fn test_admin_routes_require_token_before_rights() {
    let app = create_test_app(AppState::for_tests())
        .with_prod_routes()
        .build()
        .await;

    let req = test::TestRequest::get()
        .uri("/api/admin/sessions")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Missing or malformed Bearer token").await;
}

#[actix_web::test]
async fn test_admin_revokes_another_session() {
    let state = AppState::for_tests();
    let admin = bearer_header(&state, 1, ACTIVE_ADMIN);
    let victim = bearer_header(&state, 8, ACTIVE_HOUSING);

    let app = create_test_app(state.clone()).with_prod_routes().build().await;
    let req = test::TestRequest::delete()
        .uri("/api/admin/sessions/8")
        .insert_header(("Authorization", admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);
    assert!(!state.registry.contains(8));

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", victim))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_error_response(resp, 401, "Invalid token").await;
}

/// Route group guarded by `rule`, counting how often the handler actually runs.
fn guarded_routes(
    rule: RightHandler,
    hits: Arc<AtomicUsize>,
) -> impl Fn(&mut web::ServiceConfig) + Send + Sync + 'static {
    move |cfg: &mut web::ServiceConfig| {
        let hits = Arc::clone(&hits);
        cfg.service(
            web::scope("/guarded")
                .wrap(RequireRights::new(rule.clone()))
                .wrap(JwtExtract)
                .route(
                    "",
                    web::get().to(move || {
                        let hits = Arc::clone(&hits);
                        async move {
                            hits.fetch_add(1, Ordering::SeqCst);
                            HttpResponse::Ok().finish()
                        }
                    }),
                ),
        );
    }
}

#[actix_web::test]
async fn test_masks_are_or_across_and_within() {
    let state = AppState::for_tests();
    let hits = Arc::new(AtomicUsize::new(0));
    let rule = RightHandler::new([0b0001, 0b0110], "Nope");

    let cases = [
        (1, 0b0100, false),
        (2, 0b0110, true),
        (3, 0b0001, true),
        (4, 0b0111, true),
        (5, 0b0010, false),
    ];
    let headers: Vec<_> = cases
        .iter()
        .map(|(user_id, rights, _)| bearer_header(&state, *user_id, *rights))
        .collect();

    let app = create_test_app(state)
        .with_routes(guarded_routes(rule, Arc::clone(&hits)))
        .build()
        .await;

    for ((user_id, rights, allowed), header) in cases.iter().zip(headers) {
        let req = test::TestRequest::get()
            .uri("/guarded")
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;

        if *allowed {
            assert_eq!(resp.status().as_u16(), 200, "user {user_id} rights {rights:#06b}");
        } else {
            assert_error_response(resp, 401, "Nope").await;
        }
    }

    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[actix_web::test]
async fn test_denied_request_never_reaches_handler() {
    let state = AppState::for_tests();
    let hits = Arc::new(AtomicUsize::new(0));
    let header = bearer_header(&state, 3, ACTIVE | COPRO);

    let app = create_test_app(state)
        .with_routes(guarded_routes(rights::housing_rights(), Arc::clone(&hits)))
        .build()
        .await;
    let req = test::TestRequest::get()
        .uri("/guarded")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_response(resp, 401, "Admin or housing rights required").await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn test_admin_passes_domain_tier() {
    let state = AppState::for_tests();
    let hits = Arc::new(AtomicUsize::new(0));
    let header = bearer_header(&state, 1, ACTIVE_ADMIN);

    let app = create_test_app(state)
        .with_routes(guarded_routes(rights::copro_rights(), Arc::clone(&hits)))
        .build()
        .await;
    let req = test::TestRequest::get()
        .uri("/guarded")
        .insert_header(("Authorization", header))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
