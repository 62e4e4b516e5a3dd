use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::{
    AdminStoreDto, AdminUserDto, DashboardStats, OwnerDto, StoreSummaryDto, UserListItemDto,
};
use super::{ApiError, AppState, validation};
use crate::db::{NewUser, StorePageQuery, UserPageQuery};
use crate::domain::{self, Pagination};
use crate::entities::users::UserRole;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub search: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: Option<UserRole>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
}

#[derive(Serialize)]
pub struct UsersPageResponse {
    pub users: Vec<UserListItemDto>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct StoresPageResponse {
    pub stores: Vec<AdminStoreDto>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user: AdminUserDto,
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let (total_users, total_stores, total_ratings) = tokio::try_join!(
        state.store.count_users(),
        state.store.count_stores(),
        state.store.count_ratings(),
    )?;

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            total_users,
            total_stores,
            total_ratings,
        },
    }))
}

/// GET /api/admin/users
/// Paginated listing; each row carries the owned store (if any) and that
/// store's average rating, null when there is nothing to average.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserListParams>,
) -> Result<Json<UsersPageResponse>, ApiError> {
    let (page, limit) = validation::page_params(params.page, params.limit);

    let query = UserPageQuery {
        search: params.search,
        role: parse_role_filter(params.role.as_deref()),
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        page,
        limit,
    };

    let (users, total) = state.store.page_users(&query).await?;

    let user_ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let mut stores_by_owner = state.store.stores_by_owners_with_ratings(&user_ids).await?;

    let users = users
        .into_iter()
        .map(|user| {
            let owned = stores_by_owner.remove(&user.id);
            let (store, average_rating) = match owned {
                Some((store, ratings)) => {
                    let average = if ratings.is_empty() {
                        None
                    } else {
                        let values: Vec<i32> = ratings.iter().map(|r| r.rating).collect();
                        Some(domain::average(&values))
                    };
                    (
                        Some(StoreSummaryDto {
                            id: store.id,
                            name: store.name,
                        }),
                        average,
                    )
                }
                None => (None, None),
            };

            UserListItemDto {
                id: user.id,
                name: user.name,
                email: user.email,
                address: user.address,
                role: user.role,
                created_at: user.created_at,
                store,
                average_rating,
            }
        })
        .collect();

    Ok(Json(UsersPageResponse {
        users,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// POST /api/admin/users
/// Unlike signup, an admin may create a user of any role.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    validation::validate_user_payload(
        &payload.name,
        &payload.email,
        &payload.password,
        &payload.address,
    )?;

    if state.store.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let user = state
        .store
        .create_user(
            NewUser {
                name: payload.name,
                email: payload.email,
                password: payload.password,
                address: payload.address,
                role: payload.role.unwrap_or(UserRole::NormalUser),
            },
            &state.config.security,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            message: "User created successfully".to_string(),
            user: AdminUserDto::from(user),
        }),
    ))
}

/// GET /api/admin/stores
pub async fn list_stores(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StoreListParams>,
) -> Result<Json<StoresPageResponse>, ApiError> {
    let (page, limit) = validation::page_params(params.page, params.limit);

    let query = StorePageQuery {
        search: params.search,
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        page,
        limit,
    };

    let (rows, total) = state.store.page_stores_with_ratings(&query).await?;

    let owner_ids: Vec<i32> = rows.iter().map(|(store, _)| store.owner_id).collect();
    let owners = state.store.store_owners(&owner_ids).await?;

    let stores = rows
        .into_iter()
        .map(|(store, ratings)| {
            let values: Vec<i32> = ratings.iter().map(|r| r.rating).collect();
            let owner = owners.get(&store.owner_id).map(|o| OwnerDto {
                name: o.name.clone(),
                email: o.email.clone(),
            });

            AdminStoreDto {
                id: store.id,
                name: store.name,
                email: store.email,
                address: store.address,
                owner,
                average_rating: domain::average(&values),
                total_ratings: values.len(),
            }
        })
        .collect();

    Ok(Json(StoresPageResponse {
        stores,
        pagination: Pagination::new(page, limit, total),
    }))
}

fn parse_role_filter(role: Option<&str>) -> Option<UserRole> {
    match role {
        Some("ADMIN") => Some(UserRole::Admin),
        Some("STORE_OWNER") => Some(UserRole::StoreOwner),
        Some("NORMAL_USER") => Some(UserRole::NormalUser),
        _ => None,
    }
}
