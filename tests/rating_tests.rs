//! Store creation invariants and rating upsert/aggregation flows.

use axum::http::StatusCode;
use serde_json::json;

use raterr::entities::users::UserRole;

mod common;
use common::{
    ADMIN_EMAIL, ADMIN_PASSWORD, create_store, login, request, signup, spawn_app,
    spawn_app_with_state,
};

#[tokio::test]
async fn test_store_creation_promotes_owner() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/stores",
        Some(&admin_token),
        Some(json!({
            "name": "Corner Shop",
            "email": "corner@stores.example.com",
            "address": "7 Market Square",
            "ownerEmail": "bob@example.com",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["store"]["owner"]["email"], "bob@example.com");

    // The owner's role was force-updated as part of the creation.
    let owner_token = login(&app, "bob@example.com", "Secret123!").await;
    let (_, profile) = request(&app, "GET", "/api/auth/profile", Some(&owner_token), None).await;
    assert_eq!(profile["user"]["role"], "STORE_OWNER");
}

#[tokio::test]
async fn test_store_creation_failures() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Unknown owner email.
    let (status, body) = request(
        &app,
        "POST",
        "/api/stores",
        Some(&admin_token),
        Some(json!({
            "name": "Ghost Shop",
            "email": "ghost@stores.example.com",
            "address": "Nowhere 1",
            "ownerEmail": "missing@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Owner user not found");

    // One store per owner.
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;
    create_store(&app, &admin_token, "First Shop", "bob@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/stores",
        Some(&admin_token),
        Some(json!({
            "name": "Second Shop",
            "email": "second@stores.example.com",
            "address": "8 Market Square",
            "ownerEmail": "bob@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already owns a store");
}

#[tokio::test]
async fn test_rating_resubmission_updates_in_place() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;
    let store_id = create_store(&app, &admin_token, "Corner Shop", "bob@example.com").await;

    let alice_token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/ratings",
        Some(&alice_token),
        Some(json!({ "storeId": store_id, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"]["rating"], 5);
    assert_eq!(body["rating"]["store"]["name"], "Corner Shop");

    // Resubmitting overwrites instead of duplicating.
    let (status, _) = request(
        &app,
        "POST",
        "/api/ratings",
        Some(&alice_token),
        Some(json!({ "storeId": store_id, "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(&app, "GET", "/api/stores", Some(&alice_token), None).await;
    let store = &body["stores"][0];
    assert_eq!(store["totalRatings"], 1);
    assert_eq!(store["averageRating"], 3.0);
    assert_eq!(store["userRating"], 3);
}

#[tokio::test]
async fn test_average_rating_across_users() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;
    let store_id = create_store(&app, &admin_token, "Corner Shop", "bob@example.com").await;

    let alice_token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;
    let carol_token = signup(&app, "Carol Green", "carol@example.com", "Secret123!").await;

    for (token, value) in [(&alice_token, 5), (&carol_token, 4)] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/ratings",
            Some(token),
            Some(json!({ "storeId": store_id, "rating": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = request(&app, "GET", "/api/stores", Some(&alice_token), None).await;
    let store = &body["stores"][0];
    assert_eq!(store["averageRating"], 4.5);
    assert_eq!(store["totalRatings"], 2);
    assert_eq!(store["userRating"], 5);

    // A store with no ratings reports 0, not null.
    signup(&app, "Dan Owner", "dan@example.com", "Secret123!").await;
    create_store(&app, &admin_token, "Empty Shop", "dan@example.com").await;

    let (_, body) = request(
        &app,
        "GET",
        "/api/stores?search=Empty",
        Some(&alice_token),
        None,
    )
    .await;
    let store = &body["stores"][0];
    assert_eq!(store["averageRating"], 0.0);
    assert_eq!(store["totalRatings"], 0);
    assert!(store.get("userRating").is_none());
}

#[tokio::test]
async fn test_rating_validation_and_missing_store() {
    let app = spawn_app().await;

    let alice_token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;

    for bad in [0, 6, -1] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/ratings",
            Some(&alice_token),
            Some(json!({ "storeId": 1, "rating": bad })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = request(
        &app,
        "POST",
        "/api/ratings",
        Some(&alice_token),
        Some(json!({ "storeId": 9999, "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found");
}

#[tokio::test]
async fn test_self_rating_rejected() {
    let (state, app) = spawn_app_with_state().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;
    let store_id = create_store(&app, &admin_token, "Corner Shop", "bob@example.com").await;

    // Demote the owner back to NORMAL_USER so the request passes the role
    // gate and exercises the ownership check itself.
    let owner = state
        .store
        .get_user_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();
    state
        .store
        .set_user_role(owner.id, UserRole::NormalUser)
        .await
        .unwrap();

    let owner_token = login(&app, "bob@example.com", "Secret123!").await;
    let (status, body) = request(
        &app,
        "POST",
        "/api/ratings",
        Some(&owner_token),
        Some(json!({ "storeId": store_id, "rating": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot rate your own store");
}

#[tokio::test]
async fn test_my_ratings_listing() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;
    signup(&app, "Dan Owner", "dan@example.com", "Secret123!").await;
    let first = create_store(&app, &admin_token, "Corner Shop", "bob@example.com").await;
    let second = create_store(&app, &admin_token, "Main Shop", "dan@example.com").await;

    let alice_token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;
    for (store_id, value) in [(first, 5), (second, 2)] {
        request(
            &app,
            "POST",
            "/api/ratings",
            Some(&alice_token),
            Some(json!({ "storeId": store_id, "rating": value })),
        )
        .await;
    }

    let (status, body) = request(&app, "GET", "/api/ratings/my-ratings", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let ratings = body["ratings"].as_array().unwrap();
    assert_eq!(ratings.len(), 2);
    assert!(ratings.iter().all(|r| r["store"]["name"].is_string()));
}

#[tokio::test]
async fn test_my_store_view() {
    let app = spawn_app().await;

    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    signup(&app, "Bob Owner", "bob@example.com", "Secret123!").await;
    let store_id = create_store(&app, &admin_token, "Corner Shop", "bob@example.com").await;

    let alice_token = signup(&app, "Alice Brown", "alice@example.com", "Secret123!").await;
    request(
        &app,
        "POST",
        "/api/ratings",
        Some(&alice_token),
        Some(json!({ "storeId": store_id, "rating": 4 })),
    )
    .await;

    let owner_token = login(&app, "bob@example.com", "Secret123!").await;
    let (status, body) = request(&app, "GET", "/api/stores/my-store", Some(&owner_token), None).await;

    assert_eq!(status, StatusCode::OK);
    let store = &body["store"];
    assert_eq!(store["name"], "Corner Shop");
    assert_eq!(store["averageRating"], 4.0);
    assert_eq!(store["totalRatings"], 1);
    assert_eq!(store["ratings"][0]["user"]["email"], "alice@example.com");

    // A STORE_OWNER without a store gets a 404.
    let (_, created) = request(
        &app,
        "POST",
        "/api/admin/users",
        Some(&admin_token),
        Some(json!({
            "name": "Eve Storeless",
            "email": "eve@example.com",
            "password": "Secret123!",
            "address": "9 Empty Road",
            "role": "STORE_OWNER",
        })),
    )
    .await;
    assert_eq!(created["user"]["role"], "STORE_OWNER");

    let eve_token = login(&app, "eve@example.com", "Secret123!").await;
    let (status, _) = request(&app, "GET", "/api/stores/my-store", Some(&eve_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
