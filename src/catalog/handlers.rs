//! Service catalog handlers

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::{
    MessageResponse, PageRef, Pagination, ServiceDataResponse, ServiceDraft, ServiceListResponse,
    ServiceResponse, ServiceRow,
};
use super::query::ServiceQuery;
use super::services::CatalogService;
use crate::auth::{AuthedUser, Role};
use crate::common::{ensure_id, ApiError, AppState, EntityPrefix};
use crate::params::ValidatedParams;

const MANAGERS: [Role; 2] = [Role::Provider, Role::Admin];

fn draft_from(params: &ValidatedParams) -> Result<ServiceDraft, ApiError> {
    params
        .body_as()
        .map_err(|e| ApiError::BadRequest(format!("Invalid service body: {}", e)))
}

async fn find_service(catalog: &CatalogService, id: &str) -> Result<ServiceRow, ApiError> {
    ensure_id(EntityPrefix::Service, id)?;
    catalog
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
}

/// Owner or admin, otherwise a 401 carrying `action`.
fn ensure_manages(user: &AuthedUser, service: &ServiceRow, action: &str) -> Result<(), ApiError> {
    if service.provider_id == user.id || user.is_admin() {
        return Ok(());
    }
    warn!(user_id = %user.id, service_id = %service.id, action, "Service ownership check failed");
    Err(ApiError::Unauthorized(format!(
        "Not authorized to {} this service",
        action
    )))
}

/// `next` only when rows remain past this page, `prev` only past the first.
pub fn paginate(page: i64, limit: i64, total: i64) -> Pagination {
    let start = (page - 1).saturating_mul(limit);
    let end = page.saturating_mul(limit);
    Pagination {
        next: (end < total).then_some(PageRef {
            page: page + 1,
            limit,
        }),
        prev: (start > 0).then_some(PageRef {
            page: page - 1,
            limit,
        }),
    }
}

/// GET /api/v1/services
/// Lists services with filtering, projection, sorting and paging
///
/// # Query Parameters
/// - `field[gt|gte|lt|lte|in]=value` - Comparison filters
/// - `select` - Comma separated fields to return
/// - `sort` - Comma separated fields, `-` prefix for descending (default `-createdAt`)
/// - `page`, `limit` - Paging (defaults 1 and 25)
pub async fn get_services(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ServiceListResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let query = ServiceQuery::from_pairs(&pairs)?;
    debug!(filters = query.filters.len(), page = query.page, limit = query.limit, "Listing services");

    let catalog = CatalogService::new(state.db.clone());
    let (rows, total) = catalog.list(&query).await?;

    let data = rows
        .into_iter()
        .map(ServiceResponse::populated)
        .map(|service| serde_json::to_value(service).map(|item| query.project(item)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::InternalServer(e.to_string()))?;

    Ok(Json(ServiceListResponse {
        success: true,
        count: data.len(),
        pagination: paginate(query.page, query.limit, total),
        data,
    }))
}

/// GET /api/v1/services/:id
pub async fn get_service(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(id): Path<String>,
) -> Result<Json<ServiceDataResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let catalog = CatalogService::new(state.db.clone());
    let service = find_service(&catalog, &id).await?;

    Ok(Json(ServiceDataResponse {
        success: true,
        data: ServiceResponse::populated(service),
    }))
}

/// POST /api/v1/services
/// Creates a service owned by the acting provider
///
/// # Request Body
/// ```json
/// { "title": "Deep clean", "description": "Two rooms", "price": 40, "duration": 90, "category": "cleaning" }
/// ```
pub async fn create_service(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    params: ValidatedParams,
) -> Result<(StatusCode, Json<ServiceDataResponse>), ApiError> {
    user.authorize(&MANAGERS)?;
    let state = state_lock.read().await.clone();

    let draft = draft_from(&params)?;
    let catalog = CatalogService::new(state.db.clone());
    let service = catalog.create(draft, &user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ServiceDataResponse {
            success: true,
            data: ServiceResponse::unpopulated(service),
        }),
    ))
}

/// PUT /api/v1/services/:id
pub async fn update_service(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<String>,
    params: ValidatedParams,
) -> Result<Json<ServiceDataResponse>, ApiError> {
    user.authorize(&MANAGERS)?;
    let state = state_lock.read().await.clone();

    let catalog = CatalogService::new(state.db.clone());
    let existing = find_service(&catalog, &id).await?;
    ensure_manages(&user, &existing, "update")?;

    let draft = draft_from(&params)?;
    let service = catalog.update(&existing, draft).await?;

    Ok(Json(ServiceDataResponse {
        success: true,
        data: ServiceResponse::unpopulated(service),
    }))
}

/// DELETE /api/v1/services/:id
pub async fn delete_service(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.authorize(&MANAGERS)?;
    let state = state_lock.read().await.clone();

    let catalog = CatalogService::new(state.db.clone());
    let existing = find_service(&catalog, &id).await?;
    ensure_manages(&user, &existing, "delete")?;

    catalog.delete(&existing.id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Service deleted successfully".to_string(),
    }))
}
