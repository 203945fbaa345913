use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::models::{Role, User};
use super::password::hash_password;
use crate::common::{generate_user_id, safe_email_log, ApiError};

pub struct UsersService {
    db: SqlitePool,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Stores a new account. A taken email surfaces as a duplicate key.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, ApiError> {
        let user = User {
            id: generate_user_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
            role: role.as_str().to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.created_at)
        .execute(&self.db)
        .await?;

        info!(user_id = %user.id, email = %safe_email_log(&user.email), role = %user.role, "Registered user");

        Ok(user)
    }

    /// Loads the identity behind a token subject.
    pub async fn load_identity(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}
