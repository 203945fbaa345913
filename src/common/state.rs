// Application state shared across all modules

use sqlx::SqlitePool;

use super::config::AppConfig;

/// Application state containing the database pool and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self { db, config }
    }
}
