use super::*;
use crate::common;
use crate::common::mocks::{MockTokenRepo, MockUserRepo};
use actix_web::http::StatusCode;
use session_backend::security::{cors_middleware, security_headers};

#[actix_rt::test]
async fn health_endpoint_reports_ok() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let state = app_state(user_repo, token_repo);

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get().uri("/health").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(body, "ok");
}

#[actix_rt::test]
async fn ready_endpoint_fails_without_a_database() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    // Mock-backed state carries no pool, so readiness must degrade to 503.
    let state = app_state(user_repo, token_repo);

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get().uri("/ready").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[actix_rt::test]
async fn metrics_route_is_registered() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let state = app_state(user_repo, token_repo);

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get().uri("/metrics").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn metrics_route_requires_private_network_or_admin_auth() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let state = app_state(user_repo, token_repo);

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    // Test requests carry no peer address, which classifies as non-private.
    let request = actix_test::TestRequest::get().uri("/metrics").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn metrics_allows_admin_token_from_non_private_request() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let mut state = app_state(user_repo, token_repo);
    state.security.metrics_allow_private_only = true;
    state.security.metrics_admin_token = Some("ops-secret".to_string());

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("x-admin-token", "ops-secret"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    let body = actix_test::read_body(response).await;
    let rendered = String::from_utf8_lossy(&body);
    assert!(rendered.contains("http_requests_total"));
    assert!(rendered.contains("auth_failures_total"));
}

#[actix_rt::test]
async fn metrics_rejects_a_wrong_admin_token() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let mut state = app_state(user_repo, token_repo);
    state.security.metrics_admin_token = Some("ops-secret".to_string());

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("x-admin-token", "not-the-secret"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn metrics_open_when_private_restriction_disabled() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let mut state = app_state(user_repo, token_repo);
    state.security.metrics_allow_private_only = false;

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get().uri("/metrics").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn security_headers_are_present() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let state = app_state(user_repo, token_repo);

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let request = actix_test::TestRequest::get().uri("/health").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-content-type-options"));
    assert!(response.headers().contains_key("x-frame-options"));
    assert!(response.headers().contains_key("referrer-policy"));
    assert!(response.headers().contains_key("strict-transport-security"));
    assert!(response.headers().contains_key("content-security-policy"));
}

#[actix_rt::test]
async fn cors_preflight_respects_allowlist() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let state = app_state(user_repo, token_repo);

    let app = actix_test::init_service(
        App::new()
            .wrap(cors_middleware(&common::test_security_config()))
            .wrap(security_headers())
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await;

    let allowed_preflight = actix_test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/v1/auth/login")
        .insert_header(("Origin", "http://localhost:3000"))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .to_request();
    let allowed_response = actix_test::call_service(&app, allowed_preflight).await;
    assert_eq!(allowed_response.status(), StatusCode::OK);
    assert_eq!(
        allowed_response
            .headers()
            .get("access-control-allow-origin")
            .expect("allow origin header missing"),
        "http://localhost:3000"
    );

    let denied_preflight = actix_test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/v1/auth/login")
        .insert_header(("Origin", "http://evil.example"))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .to_request();
    let denied_response = actix_test::call_service(&app, denied_preflight).await;
    assert_eq!(denied_response.status(), StatusCode::BAD_REQUEST);
}
