// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    /// Request parameters failed their route rule set
    ParamRejected(String),
    /// Document rules failed before a write
    SchemaValidation(Vec<String>),
    /// Unique constraint hit on the named fields
    DuplicateKey(String),
    /// Identifier is not well-formed for the entity it addresses
    MalformedId(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ParamRejected(msg) => write!(f, "Invalid Parameters: {}", msg),
            ApiError::SchemaValidation(msgs) => write!(f, "Validation Error: {}", msgs.join(", ")),
            ApiError::DuplicateKey(fields) => write!(f, "Duplicate Key: {}", fields),
            ApiError::MalformedId(id) => write!(f, "Malformed Id: {}", id),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

/// Failure body for handler-level errors
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Failure body for parameter rejections
#[derive(Serialize)]
pub struct RejectionResponse {
    pub status: &'static str,
    pub code: u16,
    pub message: String,
}

impl ApiError {
    fn message_body(status: StatusCode, message: String) -> axum::response::Response {
        let body = ErrorResponse {
            success: false,
            message,
        };
        (status, Json(body)).into_response()
    }

    fn error_body(status: StatusCode, error: serde_json::Value) -> axum::response::Response {
        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Unauthorized(msg) => Self::message_body(StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => Self::message_body(StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => Self::message_body(StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => Self::message_body(StatusCode::NOT_FOUND, msg),
            ApiError::ParamRejected(message) => {
                let body = RejectionResponse {
                    status: "failed",
                    code: StatusCode::BAD_REQUEST.as_u16(),
                    message,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::SchemaValidation(msgs) => {
                Self::error_body(StatusCode::BAD_REQUEST, json!(msgs))
            }
            ApiError::DuplicateKey(fields) => Self::error_body(
                StatusCode::BAD_REQUEST,
                json!(format!("Duplicate value entered for field(s): {}", fields)),
            ),
            ApiError::MalformedId(id) => Self::error_body(
                StatusCode::NOT_FOUND,
                json!(format!("Resource not found with id of {}", id)),
            ),
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                Self::error_body(StatusCode::INTERNAL_SERVER_ERROR, json!("Server Error"))
            }
            ApiError::DatabaseError(e) => match unique_violation_fields(&e) {
                Some(fields) => ApiError::DuplicateKey(fields).into_response(),
                None => {
                    error!(error = %e, "Database error occurred");
                    Self::error_body(StatusCode::INTERNAL_SERVER_ERROR, json!("Server Error"))
                }
            },
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

/// Column names from a SQLite `UNIQUE constraint failed: users.email` error.
pub fn unique_violation_fields(e: &sqlx::Error) -> Option<String> {
    let db_err = e.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    let message = db_err.message();
    let columns = message.split_once(':').map(|(_, rest)| rest).unwrap_or(message);
    let fields: Vec<&str> = columns
        .split(',')
        .map(|col| col.trim())
        .map(|col| col.rsplit('.').next().unwrap_or(col))
        .filter(|col| !col.is_empty())
        .collect();
    Some(fields.join(", "))
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            ApiError::SchemaValidation(result.errors.into_iter().map(|e| e.message).collect())
        }
    }
}
