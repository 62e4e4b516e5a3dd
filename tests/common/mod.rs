//! Shared helpers for the integration tests: spawn the app against a
//! throwaway SQLite file and drive it with tower `oneshot` requests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use raterr::Config;
use raterr::api::AppState;

/// Bootstrap admin seeded by the initial migration.
pub const ADMIN_EMAIL: &str = "admin@storerating.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";

pub async fn spawn_app() -> Router {
    let (_, app) = spawn_app_with_state().await;
    app
}

pub async fn spawn_app_with_state() -> (Arc<AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("raterr-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let state = raterr::api::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");

    let app = raterr::api::router(state.clone());
    (state, app)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Log in and return the bearer token.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("missing token").to_string()
}

/// Sign up a NORMAL_USER and return the bearer token.
pub async fn signup(app: &Router, name: &str, email: &str, password: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": password,
            "address": "42 Test Avenue",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    body["token"].as_str().expect("missing token").to_string()
}

/// Create a store owned by the user behind `owner_email` (admin action)
/// and return the store id.
pub async fn create_store(app: &Router, admin_token: &str, name: &str, owner_email: &str) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/stores",
        Some(admin_token),
        Some(json!({
            "name": name,
            "email": format!("{}@stores.example.com", name.to_lowercase().replace(' ', "-")),
            "address": "7 Market Square",
            "ownerEmail": owner_email,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "store creation failed: {body}");
    body["store"]["id"].as_i64().expect("missing store id")
}
