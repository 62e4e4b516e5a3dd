//! Stateless bearer-token auth: claims carried in a signed JWT, one per
//! login or signup. Tokens expire after `security.jwt_expiry_hours`.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::entities::users::{self, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    #[must_use]
    pub fn new(user: &users::Model, expiry_hours: u32) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(i64::from(expiry_hours))).timestamp();

        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp,
            iat: now.timestamp(),
        }
    }
}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;
    Ok(token_data.claims)
}
