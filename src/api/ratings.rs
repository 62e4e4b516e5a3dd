use axum::{
    Extension, Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::{MyRatingDto, NameDto, RatedStoreDto, RatingDto};
use super::{ApiError, AppState, validation};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: i32,
    pub rating: i32,
}

#[derive(Serialize)]
pub struct RatingResponse {
    pub message: String,
    pub rating: RatingDto,
}

#[derive(Serialize)]
pub struct MyRatingsResponse {
    pub ratings: Vec<MyRatingDto>,
}

/// POST /api/ratings (NORMAL_USER)
/// Upserts the caller's rating for a store: resubmitting overwrites the
/// existing row instead of adding one. Rating your own store is refused.
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    validation::validate_rating_value(payload.rating)?;

    let store = state
        .store
        .get_store(payload.store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    if store.owner_id == current.id {
        return Err(ApiError::validation("You cannot rate your own store"));
    }

    let rating = state
        .store
        .upsert_rating(current.id, store.id, payload.rating)
        .await?;

    let user = state
        .store
        .get_user_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(RatingResponse {
        message: "Rating submitted successfully".to_string(),
        rating: RatingDto {
            id: rating.id,
            user_id: rating.user_id,
            store_id: rating.store_id,
            rating: rating.rating,
            created_at: rating.created_at,
            updated_at: rating.updated_at,
            user: NameDto { name: user.name },
            store: NameDto { name: store.name },
        },
    }))
}

/// GET /api/ratings/my-ratings (NORMAL_USER)
pub async fn my_ratings(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<MyRatingsResponse>, ApiError> {
    let rows = state.store.ratings_for_user(current.id).await?;

    let ratings = rows
        .into_iter()
        .filter_map(|(rating, store)| {
            let store = store?;
            Some(MyRatingDto {
                id: rating.id,
                rating: rating.rating,
                created_at: rating.created_at,
                updated_at: rating.updated_at,
                store: RatedStoreDto {
                    id: store.id,
                    name: store.name,
                    address: store.address,
                },
            })
        })
        .collect();

    Ok(Json(MyRatingsResponse { ratings }))
}
