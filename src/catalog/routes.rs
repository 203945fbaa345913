//! Service catalog routes

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::{handlers, params};
use crate::params::validate_params;

/// Creates and returns the service catalog router
///
/// # Routes
/// - `GET /api/v1/services` - Filtered, paged listing
/// - `POST /api/v1/services` - Create (provider or admin)
/// - `GET /api/v1/services/:id` - Single service
/// - `PUT /api/v1/services/:id` - Update (owner or admin)
/// - `DELETE /api/v1/services/:id` - Delete (owner or admin)
pub fn catalog_routes() -> Router {
    Router::new()
        .route(
            "/api/v1/services",
            get(handlers::get_services).merge(post(handlers::create_service).layer(
                middleware::from_fn_with_state(&*params::ADD_SERVICE, validate_params),
            )),
        )
        .route(
            "/api/v1/services/:id",
            get(handlers::get_service)
                .delete(handlers::delete_service)
                .merge(put(handlers::update_service).layer(middleware::from_fn_with_state(
                    &*params::UPDATE_SERVICE,
                    validate_params,
                ))),
        )
}
