//! Booking routes

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::{handlers, params};
use crate::params::validate_params;

/// Creates and returns the bookings router
///
/// # Routes
/// - `GET /api/v1/bookings` - Bookings visible to the caller
/// - `POST /api/v1/bookings?serviceId=` - Book a service
/// - `GET /api/v1/bookings/:id` - Single booking
/// - `PUT /api/v1/bookings/:id/status` - Change status (provider or admin)
/// - `PUT /api/v1/bookings/:id/cancel` - Cancel a pending booking (customer)
/// - `GET /api/v1/services/:id/bookings` - Bookings on one service
/// - `POST /api/v1/services/:id/bookings` - Book that service
pub fn booking_routes() -> Router {
    let add_booking = || middleware::from_fn_with_state(&*params::ADD_BOOKING, validate_params);

    Router::new()
        .route(
            "/api/v1/bookings",
            get(handlers::get_bookings).merge(post(handlers::create_booking).layer(add_booking())),
        )
        .route("/api/v1/bookings/:id", get(handlers::get_booking))
        .route(
            "/api/v1/bookings/:id/status",
            put(handlers::update_booking_status).layer(middleware::from_fn_with_state(
                &*params::UPDATE_BOOKING_STATUS,
                validate_params,
            )),
        )
        .route("/api/v1/bookings/:id/cancel", put(handlers::cancel_booking))
        // Same segment name as the catalog's `/api/v1/services/:id`.
        .route(
            "/api/v1/services/:id/bookings",
            get(handlers::get_service_bookings)
                .merge(post(handlers::create_service_booking).layer(add_booking())),
        )
}
