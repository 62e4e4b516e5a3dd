use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::{MessageResponse, UserDto};
use super::{ApiError, AppState, validation};
use crate::auth::{self, Claims};
use crate::db::NewUser;
use crate::entities::users::{self, UserRole};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserDto,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: UserDto,
}

// ============================================================================
// Middleware
// ============================================================================

/// Identity decoded from the bearer token, injected into request
/// extensions by [`authenticate`] for handlers and role gates to read.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// First gate: requires `Authorization: Bearer <token>`. No request
/// reaches a protected handler without a decodable, unexpired token.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = auth::verify_token(&token, &state.config.security.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(request).await)
}

/// Second gate: compares the decoded role against an explicit allow-list.
/// ADMIN gets no implicit access to other roles' routes.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&request, &[UserRole::Admin])?;
    Ok(next.run(request).await)
}

pub async fn require_store_owner(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&request, &[UserRole::StoreOwner])?;
    Ok(next.run(request).await)
}

pub async fn require_normal_user(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&request, &[UserRole::NormalUser])?;
    Ok(next.run(request).await)
}

fn authorize(request: &Request, allowed: &[UserRole]) -> Result<(), ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Insufficient permissions"))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Access token required"))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    Ok(token.to_string())
}

fn issue_token(state: &AppState, user: &users::Model) -> Result<String, ApiError> {
    let claims = Claims::new(user, state.config.security.jwt_expiry_hours);
    auth::generate_token(&claims, &state.config.security.jwt_secret)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/signup
/// Self-registration; new accounts always start as NORMAL_USER.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
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
                role: UserRole::NormalUser,
            },
            &state.config.security,
        )
        .await?;

    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user: UserDto::from(user),
        }),
    ))
}

/// POST /api/auth/login
/// Unknown email and wrong password produce the same 401 so the endpoint
/// leaks no account existence.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .store
        .verify_user_password(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserDto::from(user),
    }))
}

/// PUT /api/auth/password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_new_password(&payload.new_password)?;

    let user = state
        .store
        .get_user_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let verified = state
        .store
        .verify_user_password(&user.email, &payload.current_password)
        .await?;

    if verified.is_none() {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    state
        .store
        .update_user_password(current.id, &payload.new_password, &state.config.security)
        .await?;

    tracing::info!("Password changed for user {}", current.id);

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .store
        .get_user_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        user: UserDto::from(user),
    }))
}
