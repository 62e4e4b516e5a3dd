use axum::{
    Json, Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;

pub mod admin;
pub mod auth;
mod error;
pub mod ratings;
pub mod stores;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(Arc::new(AppState { config, store }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/password", put(auth::update_password))
        .route("/profile", get(auth::profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    // Listing is open to every authenticated role; creation is ADMIN-only
    // and my-store STORE_OWNER-only, so the role gates sit per subgroup
    // under a shared authenticate layer.
    let store_routes = Router::new()
        .route("/", get(stores::list_stores))
        .merge(
            Router::new()
                .route("/", post(stores::create_store))
                .route_layer(middleware::from_fn(auth::require_admin)),
        )
        .merge(
            Router::new()
                .route("/my-store", get(stores::my_store))
                .route_layer(middleware::from_fn(auth::require_store_owner)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let rating_routes = Router::new()
        .route("/", post(ratings::submit_rating))
        .route("/my-ratings", get(ratings::my_ratings))
        .route_layer(middleware::from_fn(auth::require_normal_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/stores", get(admin::list_stores))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let api_router = Router::new()
        .nest("/auth", auth_routes)
        .nest("/stores", store_routes)
        .nest("/ratings", rating_routes)
        .nest("/admin", admin_routes);

    let cors_origins = &state.config.server.cors_allowed_origins;
    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
