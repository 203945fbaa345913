use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use super::models::{BookingRow, STATUS_PENDING};
use crate::common::{generate_booking_id, ApiError};

const SELECT_JOINED: &str = r#"
    SELECT b.id, b.service_id, b.user_id, b.booking_date, b.status, b.payment_status,
           b.notes, b.created_at,
           s.title AS service_title, s.price AS service_price,
           s.duration AS service_duration, s.provider_id AS service_provider_id,
           u.name AS user_name, u.email AS user_email
    FROM bookings b
    LEFT JOIN services s ON s.id = b.service_id
    LEFT JOIN users u ON u.id = b.user_id
"#;

/// Which bookings a listing covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingScope {
    Service(String),
    ProvidedBy(String),
    BookedBy(String),
}

pub struct BookingsService {
    db: SqlitePool,
}

impl BookingsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, scope: &BookingScope) -> Result<Vec<BookingRow>, ApiError> {
        let (filter, id) = match scope {
            BookingScope::Service(id) => ("b.service_id = ?", id),
            BookingScope::ProvidedBy(id) => ("s.provider_id = ?", id),
            BookingScope::BookedBy(id) => ("b.user_id = ?", id),
        };
        let sql = format!("{} WHERE {} ORDER BY b.created_at ASC, b.id ASC", SELECT_JOINED, filter);

        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, booking_id: &str) -> Result<Option<BookingRow>, ApiError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE b.id = ?", SELECT_JOINED))
            .bind(booking_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    pub async fn create(
        &self,
        service_id: &str,
        user_id: &str,
        booking_date: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<BookingRow, ApiError> {
        let id = generate_booking_id();
        sqlx::query(
            r#"
            INSERT INTO bookings (id, service_id, user_id, booking_date, status,
                                  payment_status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(service_id)
        .bind(user_id)
        .bind(booking_date.to_rfc3339())
        .bind(STATUS_PENDING)
        .bind(STATUS_PENDING)
        .bind(notes)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        info!(booking_id = %id, service_id = %service_id, user_id = %user_id, "Created booking");

        self.get(&id)
            .await?
            .ok_or_else(|| ApiError::InternalServer(format!("booking {} vanished after insert", id)))
    }

    pub async fn set_status(&self, booking_id: &str, status: &str) -> Result<BookingRow, ApiError> {
        sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status)
            .bind(booking_id)
            .execute(&self.db)
            .await?;

        info!(booking_id = %booking_id, status = %status, "Booking status changed");

        self.get(booking_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
    }
}
