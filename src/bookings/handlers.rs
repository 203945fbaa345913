//! Booking handlers

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::models::{
    BookingDataResponse, BookingDraft, BookingListResponse, BookingResponse, BookingRow,
    ServiceTarget, StatusUpdate, STATUS_CANCELLED, STATUS_PENDING,
};
use super::services::{BookingScope, BookingsService};
use super::validators::{parse_booking_date, BookingValidator};
use crate::auth::{AuthedUser, Role};
use crate::catalog::{CatalogService, ServiceRow};
use crate::common::{ensure_id, ApiError, AppState, EntityPrefix, Validator};
use crate::params::ValidatedParams;

async fn find_service(db: &sqlx::SqlitePool, id: &str) -> Result<ServiceRow, ApiError> {
    ensure_id(EntityPrefix::Service, id)?;
    CatalogService::new(db.clone())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
}

async fn find_booking(bookings: &BookingsService, id: &str) -> Result<BookingRow, ApiError> {
    ensure_id(EntityPrefix::Booking, id)?;
    bookings
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
}

fn provides(user: &AuthedUser, booking: &BookingRow) -> bool {
    booking.service_provider_id.as_deref() == Some(user.id.as_str())
}

fn listing(rows: Vec<BookingRow>) -> Json<BookingListResponse> {
    let data: Vec<BookingResponse> = rows
        .into_iter()
        .map(|row| BookingResponse::populated(row, false))
        .collect();
    Json(BookingListResponse {
        success: true,
        count: data.len(),
        data,
    })
}

/// GET /api/v1/bookings
/// Providers see bookings on their services, everyone else their own
pub async fn get_bookings(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<BookingListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let scope = match user.role {
        Role::Provider => BookingScope::ProvidedBy(user.id.clone()),
        _ => BookingScope::BookedBy(user.id.clone()),
    };
    let rows = BookingsService::new(state.db.clone()).list(&scope).await?;
    Ok(listing(rows))
}

/// GET /api/v1/services/:serviceId/bookings
/// Bookings on one service, for its provider or an admin
pub async fn get_service_bookings(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(service_id): Path<String>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let service = find_service(&state.db, &service_id).await?;
    if service.provider_id != user.id && !user.is_admin() {
        warn!(user_id = %user.id, service_id = %service.id, "Service bookings access denied");
        return Err(ApiError::Unauthorized(
            "Not authorized to access bookings for this service".to_string(),
        ));
    }

    let rows = BookingsService::new(state.db.clone())
        .list(&BookingScope::Service(service.id))
        .await?;
    Ok(listing(rows))
}

/// GET /api/v1/bookings/:id
pub async fn get_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<BookingDataResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let bookings = BookingsService::new(state.db.clone());
    let booking = find_booking(&bookings, &id).await?;

    if booking.user_id != user.id && !provides(&user, &booking) && !user.is_admin() {
        warn!(user_id = %user.id, booking_id = %booking.id, "Booking access denied");
        return Err(ApiError::Unauthorized(
            "Not authorized to access this booking".to_string(),
        ));
    }

    Ok(Json(BookingDataResponse {
        success: true,
        data: BookingResponse::populated(booking, true),
    }))
}

async fn book(
    state: AppState,
    user: AuthedUser,
    service_id: &str,
    params: &ValidatedParams,
) -> Result<(StatusCode, Json<BookingDataResponse>), ApiError> {
    let service = find_service(&state.db, service_id).await?;

    let draft: BookingDraft = params
        .body_as()
        .map_err(|e| ApiError::BadRequest(format!("Invalid booking body: {}", e)))?;

    let booking_date = draft.booking_date.as_deref().and_then(parse_booking_date);
    if booking_date.is_some_and(|date| date < Utc::now()) {
        return Err(ApiError::BadRequest(
            "Booking date must be in the future".to_string(),
        ));
    }
    BookingValidator.validate(&draft).into_result()?;
    let booking_date = booking_date
        .ok_or_else(|| ApiError::InternalServer("booking date passed validation unparsed".into()))?;

    let booking = BookingsService::new(state.db.clone())
        .create(&service.id, &user.id, booking_date, draft.notes.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingDataResponse {
            success: true,
            data: BookingResponse::unpopulated(booking),
        }),
    ))
}

/// POST /api/v1/bookings?serviceId=S_...
///
/// # Request Body
/// ```json
/// { "bookingDate": "2030-01-15T10:30:00Z", "notes": "Ring twice" }
/// ```
pub async fn create_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    params: ValidatedParams,
) -> Result<(StatusCode, Json<BookingDataResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let Some(service_id) = params
        .query_as::<ServiceTarget>()
        .ok()
        .and_then(|target| target.service_id)
    else {
        return Err(ApiError::NotFound("Service not found".to_string()));
    };

    book(state, user, &service_id, &params).await
}

/// POST /api/v1/services/:serviceId/bookings
pub async fn create_service_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(service_id): Path<String>,
    params: ValidatedParams,
) -> Result<(StatusCode, Json<BookingDataResponse>), ApiError> {
    let state = state_lock.read().await.clone();
    book(state, user, &service_id, &params).await
}

/// PUT /api/v1/bookings/:id/status
/// Providers of the booked service and admins move a booking between statuses
pub async fn update_booking_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<String>,
    params: ValidatedParams,
) -> Result<Json<BookingDataResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let bookings = BookingsService::new(state.db.clone());
    let booking = find_booking(&bookings, &id).await?;

    if !provides(&user, &booking) && !user.is_admin() {
        warn!(user_id = %user.id, booking_id = %booking.id, "Booking status change denied");
        return Err(ApiError::Unauthorized(
            "Not authorized to update this booking".to_string(),
        ));
    }

    let update: StatusUpdate = params.body_as().unwrap_or_default();
    let Some(status) = update.canonical() else {
        return Err(ApiError::BadRequest("Invalid status value".to_string()));
    };

    let updated = bookings.set_status(&booking.id, status).await?;
    Ok(Json(BookingDataResponse {
        success: true,
        data: BookingResponse::unpopulated(updated),
    }))
}

/// PUT /api/v1/bookings/:id/cancel
/// Customers withdraw their own pending bookings
pub async fn cancel_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<BookingDataResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let bookings = BookingsService::new(state.db.clone());
    let booking = find_booking(&bookings, &id).await?;

    if booking.user_id != user.id {
        warn!(user_id = %user.id, booking_id = %booking.id, "Booking cancel denied");
        return Err(ApiError::Unauthorized(
            "Not authorized to cancel this booking".to_string(),
        ));
    }
    if booking.status != STATUS_PENDING {
        return Err(ApiError::BadRequest(
            "Only pending bookings can be cancelled".to_string(),
        ));
    }

    let updated = bookings.set_status(&booking.id, STATUS_CANCELLED).await?;
    Ok(Json(BookingDataResponse {
        success: true,
        data: BookingResponse::unpopulated(updated),
    }))
}
