use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

pub const BOOKING_STATUSES: [&str; 4] = ["pending", "confirmed", "cancelled", "completed"];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CANCELLED: &str = "cancelled";

/// Booking row joined with its service and customer
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub booking_date: String,
    pub status: String,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub service_title: Option<String>,
    pub service_price: Option<f64>,
    pub service_duration: Option<f64>,
    pub service_provider_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub price: f64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Linked<T> {
    Id(String),
    Populated(T),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub service: Linked<ServiceSummary>,
    pub user: Linked<CustomerSummary>,
    pub booking_date: String,
    pub status: String,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

impl BookingResponse {
    /// References as bare ids.
    pub fn unpopulated(row: BookingRow) -> Self {
        Self {
            service: Linked::Id(row.service_id),
            user: Linked::Id(row.user_id),
            id: row.id,
            booking_date: row.booking_date,
            status: row.status,
            payment_status: row.payment_status,
            notes: row.notes,
            created_at: row.created_at,
        }
    }

    /// Service and customer inlined. `with_provider` adds the service's provider id.
    pub fn populated(row: BookingRow, with_provider: bool) -> Self {
        let service = match (row.service_title, row.service_price, row.service_duration) {
            (Some(title), Some(price), Some(duration)) => Linked::Populated(ServiceSummary {
                id: row.service_id,
                title,
                price,
                duration,
                provider: row.service_provider_id.filter(|_| with_provider),
            }),
            _ => Linked::Id(row.service_id),
        };
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => Linked::Populated(CustomerSummary {
                id: row.user_id,
                name,
                email,
            }),
            _ => Linked::Id(row.user_id),
        };
        Self {
            id: row.id,
            service,
            user,
            booking_date: row.booking_date,
            status: row.status,
            payment_status: row.payment_status,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// Create body after parameter validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingDraft {
    #[serde(rename = "bookingDate", default, deserialize_with = "date_input")]
    pub booking_date: Option<String>,
    pub notes: Option<String>,
}

/// Strings pass through. Numbers are epoch milliseconds and become RFC 3339;
/// anything else keeps its JSON text so the date check reports it.
fn date_input<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64));
            Some(
                millis
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                    .unwrap_or_else(|| n.to_string()),
            )
        }
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

impl StatusUpdate {
    /// Canonical status when the value names one, ignoring case and padding.
    pub fn canonical(&self) -> Option<&'static str> {
        let status = self.status.as_deref()?.trim();
        BOOKING_STATUSES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(status))
            .copied()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceTarget {
    #[serde(rename = "serviceId")]
    pub service_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<BookingResponse>,
}

#[derive(Debug, Serialize)]
pub struct BookingDataResponse {
    pub success: bool,
    pub data: BookingResponse,
}
