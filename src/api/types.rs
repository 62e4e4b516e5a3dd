use serde::Serialize;

use crate::domain;
use crate::entities::users::UserRole;
use crate::entities::{ratings, stores, users};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: UserRole,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
            role: model.role,
        }
    }
}

/// User shape returned by admin endpoints; includes the creation time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: UserRole,
    pub created_at: String,
}

impl From<users::Model> for AdminUserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

/// Row of the admin user listing: the owned store (if any) and the
/// derived average rating of that store. `averageRating` stays null for
/// users without a store or with an unrated store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItemDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: UserRole,
    pub created_at: String,
    pub store: Option<StoreSummaryDto>,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummaryDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDto {
    pub name: String,
    pub email: String,
}

/// Full store record as returned from creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: i32,
    pub created_at: String,
    pub owner: OwnerDto,
}

/// Store listing row with the caller's own rating attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithRatingDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub average_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<i32>,
    pub total_ratings: usize,
}

impl StoreWithRatingDto {
    /// Aggregate one store's rating rows from the viewpoint of `user_id`.
    #[must_use]
    pub fn build(store: stores::Model, ratings: &[ratings::Model], user_id: i32) -> Self {
        let values: Vec<i32> = ratings.iter().map(|r| r.rating).collect();
        let user_rating = ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.rating);

        Self {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            average_rating: domain::average(&values),
            user_rating,
            total_ratings: values.len(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStoreDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner: Option<OwnerDto>,
    pub average_rating: f64,
    pub total_ratings: usize,
}

/// The owner's view of their store, rating rows included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyStoreDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub created_at: String,
    pub average_rating: f64,
    pub total_ratings: usize,
    pub ratings: Vec<StoreRatingDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatingDto {
    pub id: i32,
    pub rating: i32,
    pub created_at: String,
    pub updated_at: String,
    pub user: RatingUserDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingUserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct NameDto {
    pub name: String,
}

/// Submission response: the stored row plus the names on each side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDto {
    pub id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub rating: i32,
    pub created_at: String,
    pub updated_at: String,
    pub user: NameDto,
    pub store: NameDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRatingDto {
    pub id: i32,
    pub rating: i32,
    pub created_at: String,
    pub updated_at: String,
    pub store: RatedStoreDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedStoreDto {
    pub id: i32,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}
