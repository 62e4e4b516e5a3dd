//! Auth flows and the two-stage access-control gate.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, login, request, signup, spawn_app};

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app().await;

    for uri in ["/", "/health"] {
        let (status, body) = request(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_signup_creates_normal_user() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Alice Brown",
            "email": "alice@example.com",
            "password": "Secret123!",
            "address": "321 Customer Lane",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["role"], "NORMAL_USER");
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_duplicate_signup_email_conflicts() {
    let app = spawn_app().await;

    signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Alice Again",
            "email": "alice@example.com",
            "password": "Secret123!",
            "address": "321 Customer Lane",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists with this email");
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "",
            "email": "not-an-email",
            "password": "short",
            "address": "",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = spawn_app().await;

    // Wrong password for an existing account.
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body.get("token").is_none());

    // Unknown email gets the identical answer.
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_login_succeeds_with_seeded_admin() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = spawn_app().await;

    let (status, _) = request(&app, "GET", "/api/stores", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/stores", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/admin/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_returns_current_user() {
    let app = spawn_app().await;

    let token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;

    let (status, body) = request(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["name"], "Alice Brown");
}

#[tokio::test]
async fn test_password_change_flow() {
    let app = spawn_app().await;

    let token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;

    // Wrong current password.
    let (status, body) = request(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&token),
        Some(json!({ "currentPassword": "nope-nope", "newPassword": "Fresh456!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Current password is incorrect");

    // Correct current password.
    let (status, _) = request(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&token),
        Some(json!({ "currentPassword": "Secret123!", "newPassword": "Fresh456!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, new one does.
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "Secret123!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    login(&app, "alice@example.com", "Fresh456!").await;
}

#[tokio::test]
async fn test_role_gates_are_exact() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let user_token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;

    // NORMAL_USER cannot reach admin routes.
    let (status, _) = request(&app, "GET", "/api/admin/dashboard", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // ADMIN is not implicitly a NORMAL_USER.
    let (status, _) = request(
        &app,
        "POST",
        "/api/ratings",
        Some(&admin_token),
        Some(json!({ "storeId": 1, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nor a STORE_OWNER.
    let (status, _) = request(&app, "GET", "/api/stores/my-store", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The store listing is open to every authenticated role.
    let (status, _) = request(&app, "GET", "/api/stores", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&app, "GET", "/api/stores", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::OK);
}
