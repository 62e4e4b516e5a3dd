use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Per-field validation detail carried in the `errors` list.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Option<Vec<FieldError>>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wire shape of every error response.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            Self::Validation { message, errors } => (StatusCode::BAD_REQUEST, message, errors),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            Self::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody { message, errors };
        (status, Json(body)).into_response()
    }
}

/// Persistence-layer failures are translated here, centrally, instead of
/// per handler: a unique-constraint violation becomes 409, a missing
/// record 404, anything else a logged 500.
impl From<&sea_orm::DbErr> for ApiError {
    fn from(err: &sea_orm::DbErr) -> Self {
        if matches!(err, sea_orm::DbErr::RecordNotFound(_)) {
            return Self::NotFound("Record not found".to_string());
        }

        let msg = err.to_string();
        if msg.contains("UNIQUE constraint failed") {
            return Self::Conflict("A record with this information already exists".to_string());
        }

        Self::Database(msg)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::from(&err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(db_err) = cause.downcast_ref::<sea_orm::DbErr>() {
                return Self::from(db_err);
            }
        }
        Self::Internal(format!("{err:#}"))
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors: None,
        }
    }

    pub fn validation_fields(msg: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::Validation {
            message: msg.into(),
            errors: Some(errors),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
