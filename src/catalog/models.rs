use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const CATEGORIES: [&str; 6] = ["cleaning", "repair", "beauty", "health", "education", "other"];

/// Service row joined with its provider's public fields
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration: f64,
    pub category: String,
    pub provider_id: String,
    pub is_active: bool,
    pub created_at: String,
    pub provider_name: Option<String>,
    pub provider_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Provider reference, either the bare id or the populated summary
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ProviderRef {
    Id(String),
    Populated(ProviderSummary),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration: f64,
    pub category: String,
    pub provider: ProviderRef,
    pub is_active: bool,
    pub created_at: String,
}

impl ServiceResponse {
    pub fn unpopulated(row: ServiceRow) -> Self {
        Self::build(row, false)
    }

    pub fn populated(row: ServiceRow) -> Self {
        Self::build(row, true)
    }

    fn build(row: ServiceRow, populate: bool) -> Self {
        let provider = match (populate, row.provider_name, row.provider_email) {
            (true, Some(name), Some(email)) => ProviderRef::Populated(ProviderSummary {
                id: row.provider_id,
                name,
                email,
            }),
            _ => ProviderRef::Id(row.provider_id),
        };
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            duration: row.duration,
            category: row.category,
            provider,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Create/update body after parameter validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl ServiceDraft {
    /// Fields present in `self` win over the stored service.
    pub fn merged_over(self, existing: &ServiceRow) -> Self {
        Self {
            title: self.title.or_else(|| Some(existing.title.clone())),
            description: self
                .description
                .or_else(|| Some(existing.description.clone())),
            price: self.price.or(Some(existing.price)),
            duration: self.duration.or(Some(existing.duration)),
            category: self.category.or_else(|| Some(existing.category.clone())),
            is_active: self.is_active.or(Some(existing.is_active)),
        }
    }

    /// Maps a category onto its canonical lowercase spelling when it names one.
    pub fn canonical_category(&self) -> Option<String> {
        self.category.as_deref().map(|c| {
            CATEGORIES
                .iter()
                .find(|known| known.eq_ignore_ascii_case(c.trim()))
                .map(|known| known.to_string())
                .unwrap_or_else(|| c.to_string())
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ServiceDataResponse {
    pub success: bool,
    pub data: ServiceResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
