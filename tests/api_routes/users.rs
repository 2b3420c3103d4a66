use super::*;
use crate::common::fixtures;
use crate::common::mocks::{MockTokenRepo, MockUserRepo};
use actix_web::http::StatusCode;
use serde_json::json;

#[actix_rt::test]
async fn user_routes_require_a_token() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let app = setup_app(app_state(user_repo, token_repo)).await;

    let request = actix_test::TestRequest::get().uri("/api/v1/users").to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn user_routes_reject_non_admins() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let user = fixtures::password_user("plain@example.com", "correct-password");
    user_repo.push(user.clone());
    let app = setup_app(app_state(user_repo, token_repo)).await;
    let bearer = bearer_for(&user);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({ "email": "someone@example.com" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", user.id))
        .insert_header(("Authorization", bearer))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn admin_lists_all_accounts() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let admin = fixtures::admin_user("admin@example.com", "admin-password");
    user_repo.push(admin.clone());
    user_repo.push(fixtures::password_user("one@example.com", "password-one"));
    user_repo.push(fixtures::provider_user("two@example.com"));
    let app = setup_app(app_state(user_repo, token_repo)).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    let listed = body.as_array().expect("list endpoint returns an array");
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|entry| entry.get("password_hash").is_none()));
}

#[actix_rt::test]
async fn admin_fetches_accounts_by_id_or_email() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let admin = fixtures::admin_user("admin@example.com", "admin-password");
    let user = fixtures::password_user("findme@example.com", "correct-password");
    user_repo.push(admin.clone());
    user_repo.push(user.clone());
    let app = setup_app(app_state(user_repo, token_repo)).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", user.id))
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let by_id: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(by_id["email"], "findme@example.com");

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/findme@example.com")
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let by_email: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(by_email["id"], by_id["id"]);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/missing@example.com")
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[actix_rt::test]
async fn admin_upsert_creates_then_patches() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let admin = fixtures::admin_user("admin@example.com", "admin-password");
    user_repo.push(admin.clone());
    let app = setup_app(app_state(user_repo.clone(), token_repo)).await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer_for(&admin)))
        .set_json(json!({
            "email": "managed@example.com",
            "password": "managed-password"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let created: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(created["email"], "managed@example.com");
    assert_eq!(created["roles"], json!(["user"]));
    assert_eq!(user_repo.user_count(), 2);

    // Same email again patches the existing row instead of inserting.
    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer_for(&admin)))
        .set_json(json!({
            "email": "managed@example.com",
            "roles": ["user", "admin"]
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(patched["id"], created["id"]);
    assert_eq!(patched["roles"], json!(["user", "admin"]));
    assert_eq!(user_repo.user_count(), 2);

    let users = user_repo.users.lock().expect("users mutex poisoned");
    let managed = users
        .iter()
        .find(|user| user.email == "managed@example.com")
        .expect("patched account is stored");
    assert!(managed.password_hash.is_some(), "patch without password keeps the hash");
}

#[actix_rt::test]
async fn admin_upsert_rejects_bad_payloads() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let admin = fixtures::admin_user("admin@example.com", "admin-password");
    user_repo.push(admin.clone());
    let app = setup_app(app_state(user_repo.clone(), token_repo)).await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer_for(&admin)))
        .set_json(json!({ "password": "no-email-given" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users")
        .insert_header(("Authorization", bearer_for(&admin)))
        .set_json(json!({ "email": "not-an-email" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(user_repo.user_count(), 1);
}

#[actix_rt::test]
async fn admin_delete_removes_the_account_and_its_sessions() {
    let user_repo = Arc::new(MockUserRepo::default());
    let token_repo = Arc::new(MockTokenRepo::default());
    let admin = fixtures::admin_user("admin@example.com", "admin-password");
    let user = fixtures::password_user("doomed@example.com", "correct-password");
    user_repo.push(admin.clone());
    user_repo.push(user.clone());
    token_repo.insert_record(fixtures::refresh_record("doomed-session", user.id, "laptop", 7));
    let app = setup_app(app_state(user_repo.clone(), token_repo.clone())).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", user.id))
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(user_repo.user_count(), 1);
    assert_eq!(token_repo.token_count(), 0, "deleting an account revokes its sessions");

    // A second delete finds nothing.
    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", user.id))
        .insert_header(("Authorization", bearer_for(&admin)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
