//! Authentication handlers

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, Role, SignupRequest, TokenResponse, UserDataResponse};
use super::password::verify_password;
use super::services::UsersService;
use super::tokens::issue_token;
use super::validators::SignupValidator;
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::params::ValidatedParams;

/// POST /api/v1/auth/signup
/// Registers an account and returns a signed token
///
/// # Request Body
/// ```json
/// { "name": "Asha", "email": "asha@example.com", "password": "secret1", "role": "provider" }
/// ```
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    params: ValidatedParams,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let request: SignupRequest = params
        .body_as()
        .map_err(|e| ApiError::BadRequest(format!("Invalid signup body: {}", e)))?;
    SignupValidator.validate(&request).into_result()?;

    let (Some(name), Some(email), Some(password)) = (
        request.name.as_deref(),
        request.email.as_deref(),
        request.password.as_deref(),
    ) else {
        return Err(ApiError::BadRequest("Please provide name, email and password".into()));
    };
    let role = request
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or(Role::User);

    let users = UsersService::new(state.db.clone());
    let user = users.create_user(name, email, password, role).await?;
    let token = issue_token(&user.id, &state.config.jwt_secret, state.config.jwt_expire_days)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token,
        }),
    ))
}

/// POST /api/v1/auth/login
/// Exchanges email and password for a signed token
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    params: ValidatedParams,
) -> Result<Json<TokenResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let request: LoginRequest = params.body_as().unwrap_or_default();
    let (Some(email), Some(password)) = (
        request.email.as_deref().filter(|e| !e.is_empty()),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Please provide an email and password".to_string(),
        ));
    };

    let users = UsersService::new(state.db.clone());
    let user = match users.find_by_email(email).await? {
        Some(user) if verify_password(password, &user.password_hash) => user,
        _ => {
            warn!(email = %safe_email_log(email), "Login rejected: invalid credentials");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    let token = issue_token(&user.id, &state.config.jwt_secret, state.config.jwt_expire_days)?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        success: true,
        message: "Loggedin successfully!".to_string(),
        token,
    }))
}

/// GET /api/v1/auth/get-user-data
/// Returns the account behind the bearer token
pub async fn get_user_data(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<UserDataResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let users = UsersService::new(state.db.clone());
    let data = users
        .load_identity(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserDataResponse {
        success: true,
        data,
    }))
}
