use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::models::{ServiceDraft, ServiceRow};
use super::query::ServiceQuery;
use super::validators::ServiceValidator;
use crate::common::{generate_service_id, ApiError, Validator};

const SELECT_WITH_PROVIDER: &str = r#"
    SELECT s.id, s.title, s.description, s.price, s.duration, s.category,
           s.provider_id, s.is_active, s.created_at,
           u.name AS provider_name, u.email AS provider_email
    FROM services s
    LEFT JOIN users u ON u.id = s.provider_id
"#;

pub struct CatalogService {
    db: SqlitePool,
}

impl CatalogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// One page of services matching `query`, plus the total match count.
    pub async fn list(&self, query: &ServiceQuery) -> Result<(Vec<ServiceRow>, i64), ApiError> {
        let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM services s");
        query.push_where(&mut count);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        let mut select: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_WITH_PROVIDER);
        query.push_where(&mut select);
        query.push_order(&mut select);
        select.push(" LIMIT ");
        select.push_bind(query.limit);
        select.push(" OFFSET ");
        select.push_bind(query.offset());

        let rows = select
            .build_query_as::<ServiceRow>()
            .fetch_all(&self.db)
            .await?;

        Ok((rows, total))
    }

    pub async fn get(&self, service_id: &str) -> Result<Option<ServiceRow>, ApiError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!("{} WHERE s.id = ?", SELECT_WITH_PROVIDER))
            .bind(service_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    /// Validates the draft and stores it under `provider_id`.
    pub async fn create(&self, draft: ServiceDraft, provider_id: &str) -> Result<ServiceRow, ApiError> {
        let draft = ServiceDraft {
            category: draft.canonical_category(),
            title: draft.title.map(|t| t.trim().to_string()),
            ..draft
        };
        ServiceValidator.validate(&draft).into_result()?;

        let id = generate_service_id();
        sqlx::query(
            r#"
            INSERT INTO services (id, title, description, price, duration, category,
                                  provider_id, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.duration)
        .bind(&draft.category)
        .bind(provider_id)
        .bind(draft.is_active.unwrap_or(true))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        info!(service_id = %id, provider_id = %provider_id, "Created service");

        self.get(&id)
            .await?
            .ok_or_else(|| ApiError::InternalServer(format!("service {} vanished after insert", id)))
    }

    /// Applies `draft` over `existing`, re-running document validation.
    pub async fn update(&self, existing: &ServiceRow, draft: ServiceDraft) -> Result<ServiceRow, ApiError> {
        let merged = draft.merged_over(existing);
        let merged = ServiceDraft {
            category: merged.canonical_category(),
            title: merged.title.map(|t| t.trim().to_string()),
            ..merged
        };
        ServiceValidator.validate(&merged).into_result()?;

        sqlx::query(
            r#"
            UPDATE services
            SET title = ?, description = ?, price = ?, duration = ?, category = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(&merged.title)
        .bind(&merged.description)
        .bind(merged.price)
        .bind(merged.duration)
        .bind(&merged.category)
        .bind(merged.is_active.unwrap_or(true))
        .bind(&existing.id)
        .execute(&self.db)
        .await?;

        info!(service_id = %existing.id, "Updated service");

        self.get(&existing.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
    }

    /// Removes the service. Its bookings go with it.
    pub async fn delete(&self, service_id: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(service_id)
            .execute(&self.db)
            .await?;
        info!(service_id = %service_id, "Deleted service");
        Ok(())
    }
}
