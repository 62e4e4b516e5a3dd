use super::error::{ApiError, FieldError};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

pub fn validate_rating_value(rating: i32) -> Result<i32, ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::validation_fields(
            "Validation failed",
            vec![FieldError {
                field: "rating".to_string(),
                message: "Rating must be an integer between 1 and 5".to_string(),
            }],
        ));
    }
    Ok(rating)
}

/// Shared checks for signup and admin user creation.
pub fn validate_user_payload(
    name: &str,
    email: &str,
    password: &str,
    address: &str,
) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(field_error("name", "Name is required"));
    }
    if !is_plausible_email(email) {
        errors.push(field_error("email", "A valid email is required"));
    }
    if password.len() < 8 {
        errors.push(field_error(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if address.trim().is_empty() {
        errors.push(field_error("address", "Address is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_fields("Validation failed", errors))
    }
}

pub fn validate_store_payload(
    name: &str,
    email: &str,
    address: &str,
    owner_email: &str,
) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(field_error("name", "Name is required"));
    }
    if !is_plausible_email(email) {
        errors.push(field_error("email", "A valid email is required"));
    }
    if address.trim().is_empty() {
        errors.push(field_error("address", "Address is required"));
    }
    if !is_plausible_email(owner_email) {
        errors.push(field_error("ownerEmail", "A valid owner email is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_fields("Validation failed", errors))
    }
}

pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "New password must be at least 8 characters",
        ));
    }
    Ok(())
}

/// Normalize optional page/limit query params: 1-based page, limit
/// clamped to [1, 100], defaults 1/10.
#[must_use]
pub fn page_params(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
    let limit = limit
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT);
    (page, limit)
}

fn is_plausible_email(email: &str) -> bool {
    let trimmed = email.trim();
    !trimmed.is_empty() && trimmed.contains('@') && !trimmed.starts_with('@') && !trimmed.ends_with('@')
}

fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
    }
}
