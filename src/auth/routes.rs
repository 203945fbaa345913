//! Authentication routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::{handlers, params};
use crate::params::validate_params;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/v1/auth/signup` - Register an account
/// - `POST /api/v1/auth/login` - Exchange credentials for a token
/// - `GET /api/v1/auth/get-user-data` - Current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route(
            "/api/v1/auth/signup",
            post(handlers::register)
                .layer(middleware::from_fn_with_state(&*params::SIGNUP, validate_params)),
        )
        .route(
            "/api/v1/auth/login",
            post(handlers::login)
                .layer(middleware::from_fn_with_state(&*params::LOGIN, validate_params)),
        )
        .route("/api/v1/auth/get-user-data", get(handlers::get_user_data))
}
