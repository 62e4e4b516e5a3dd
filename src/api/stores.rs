use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::{
    MyStoreDto, OwnerDto, RatingUserDto, StoreDto, StoreRatingDto, StoreWithRatingDto,
};
use super::{ApiError, AppState, validation};
use crate::db::NewStore;
use crate::domain;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_email: String,
}

#[derive(Serialize)]
pub struct StoresResponse {
    pub stores: Vec<StoreWithRatingDto>,
}

#[derive(Serialize)]
pub struct StoreCreatedResponse {
    pub message: String,
    pub store: StoreDto,
}

#[derive(Serialize)]
pub struct MyStoreResponse {
    pub store: MyStoreDto,
}

/// GET /api/stores
/// Every store with its average rating, total count and the caller's own
/// rating. `search` substring-matches name and address.
pub async fn list_stores(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<StoresResponse>, ApiError> {
    let rows = state
        .store
        .list_stores_with_ratings(
            query.search.as_deref(),
            query.sort_by.as_deref(),
            query.sort_order.as_deref(),
        )
        .await?;

    let stores = rows
        .into_iter()
        .map(|(store, ratings)| StoreWithRatingDto::build(store, &ratings, current.id))
        .collect();

    Ok(Json(StoresResponse { stores }))
}

/// POST /api/stores (ADMIN)
/// Creates a store for an existing user and promotes that user to
/// STORE_OWNER; the promotion and the insert commit together.
pub async fn create_store(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreCreatedResponse>), ApiError> {
    validation::validate_store_payload(
        &payload.name,
        &payload.email,
        &payload.address,
        &payload.owner_email,
    )?;

    let owner = state
        .store
        .get_user_by_email(&payload.owner_email)
        .await?
        .ok_or_else(|| ApiError::not_found("Owner user not found"))?;

    if state.store.get_store_by_owner(owner.id).await?.is_some() {
        return Err(ApiError::conflict("User already owns a store"));
    }

    let store = state
        .store
        .create_store(NewStore {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            owner_id: owner.id,
        })
        .await?;

    tracing::info!("Store {} created for owner {}", store.id, owner.id);

    Ok((
        StatusCode::CREATED,
        Json(StoreCreatedResponse {
            message: "Store created successfully".to_string(),
            store: StoreDto {
                id: store.id,
                name: store.name,
                email: store.email,
                address: store.address,
                owner_id: store.owner_id,
                created_at: store.created_at,
                owner: OwnerDto {
                    name: owner.name,
                    email: owner.email,
                },
            },
        }),
    ))
}

/// GET /api/stores/my-store (STORE_OWNER)
pub async fn my_store(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MyStoreResponse>, ApiError> {
    let store = state
        .store
        .get_store_by_owner(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    let rows = state.store.ratings_for_store(store.id).await?;

    let values: Vec<i32> = rows.iter().map(|(r, _)| r.rating).collect();
    let ratings = rows
        .into_iter()
        .filter_map(|(rating, user)| {
            let user = user?;
            Some(StoreRatingDto {
                id: rating.id,
                rating: rating.rating,
                created_at: rating.created_at,
                updated_at: rating.updated_at,
                user: RatingUserDto {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                },
            })
        })
        .collect();

    Ok(Json(MyStoreResponse {
        store: MyStoreDto {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            created_at: store.created_at,
            average_rating: domain::average(&values),
            total_ratings: values.len(),
            ratings,
        },
    }))
}
