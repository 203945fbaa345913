//! Identity token issuance and verification (HS256 JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::warn;

use super::models::Claims;
use crate::common::{safe_token_log, ApiError};

/// Signs a token whose subject is `user_id`.
pub fn issue_token(user_id: &str, secret: &str, expire_days: i64) -> Result<String, ApiError> {
    let exp = Duration::try_days(expire_days)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| {
            ApiError::InternalServer(format!("token lifetime out of range: {} days", expire_days))
        })?
        .timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::InternalServer(format!("token encoding failed: {}", e)))
}

/// Verifies signature and expiry.
pub fn verify_identity_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!(error = %e, token = %safe_token_log(token), "JWT token validation failed");
        ApiError::Unauthorized(super::NOT_AUTHORIZED.to_string())
    })
}
