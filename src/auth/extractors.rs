//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::Role;
use super::services::UsersService;
use super::tokens::verify_identity_token;
use super::NOT_AUTHORIZED;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the bearer token and loads the acting user from the database.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthedUser {
    /// Role gate: rejects users whose role is not in `allowed`.
    pub fn authorize(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            warn!(user_id = %self.id, role = %self.role, "Role not permitted for route");
            Err(ApiError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                self.role
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// `Authorization: Bearer <token>` → token. Anything else yields `None`.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer")
        .and_then(|rest| rest.split(' ').nth(1))
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        let Some(token) = token else {
            warn!("Authentication failed: missing bearer token");
            return Err(ApiError::Unauthorized(NOT_AUTHORIZED.to_string()));
        };

        let claims = verify_identity_token(&token, &app_state.config.jwt_secret)?;

        let users = UsersService::new(app_state.db.clone());
        match users.load_identity(&claims.sub).await? {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    role = %u.role,
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    role: u.role(),
                    id: u.id,
                    name: u.name,
                    email: u.email,
                })
            }
            None => {
                warn!(user_id = %claims.sub, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized(NOT_AUTHORIZED.to_string()))
            }
        }
    }
}
