//! Route layer running a [`RuleSet`] before the handler.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
    Form,
};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::engine::{validate, ValidationOutcome};
use super::input::{fields_from_pairs, push_field, FileAttachment, Fields, InputRecord};
use super::rules::RuleSet;
use crate::common::config::DEFAULT_MAX_BODY_BYTES;
use crate::common::{ApiError, AppState};

/// Normalized parameters of a request that passed its rule set.
#[derive(Debug, Clone)]
pub struct ValidatedParams(pub InputRecord);

impl Deref for ValidatedParams {
    type Target = InputRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ValidatedParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ValidatedParams>()
            .cloned()
            .ok_or_else(|| ApiError::InternalServer("route has no parameter rules".to_string()))
    }
}

/// Middleware for `middleware::from_fn_with_state(&RULES, validate_params)`.
///
/// Rejections never reach the handler. Accepted requests carry a
/// [`ValidatedParams`] extension and the original body bytes.
pub async fn validate_params(
    State(rules): State<&'static RuleSet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();

    let limit = match parts.extensions.get::<Arc<RwLock<AppState>>>() {
        Some(state) => state.read().await.config.max_body_bytes,
        None => DEFAULT_MAX_BODY_BYTES,
    };
    let bytes = to_bytes(body, limit).await.map_err(|e| {
        warn!(error = %e, uri = %parts.uri, "Failed to read request body");
        ApiError::BadRequest("Request body could not be read".to_string())
    })?;

    let query = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        Ok(Query(pairs)) => fields_from_pairs(pairs),
        Err(e) => {
            debug!(error = %e, uri = %parts.uri, "Unparseable query string");
            return Err(ApiError::BadRequest("Malformed query string".to_string()));
        }
    };

    let (body_fields, files) = read_body(&parts.headers, bytes.clone()).await?;
    let record = InputRecord::new(query, body_fields).with_files(files);

    match validate(rules, &record) {
        ValidationOutcome::Accepted(normalized) => {
            let mut request = Request::from_parts(parts, Body::from(bytes));
            request.extensions_mut().insert(ValidatedParams(normalized));
            Ok(next.run(request).await)
        }
        ValidationOutcome::Rejected(err) => {
            debug!(field = %err.field(), message = %err, "Request parameters rejected");
            Err(ApiError::ParamRejected(err.to_string()))
        }
    }
}

enum BodyKind {
    Json,
    Form,
    Multipart,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let essence = content_type.split(';').next().unwrap_or_default().trim();

    if essence == "application/json" || essence.ends_with("+json") {
        BodyKind::Json
    } else if essence == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if essence == "multipart/form-data" {
        BodyKind::Multipart
    } else {
        BodyKind::Other
    }
}

async fn read_body(
    headers: &HeaderMap,
    bytes: bytes::Bytes,
) -> Result<(Fields, Vec<FileAttachment>), ApiError> {
    if bytes.is_empty() {
        return Ok((Fields::new(), Vec::new()));
    }

    match body_kind(headers) {
        BodyKind::Json => {
            let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
                debug!(error = %e, "Invalid JSON request body");
                ApiError::BadRequest("Invalid JSON in request body".to_string())
            })?;
            match value {
                Value::Object(fields) => Ok((fields, Vec::new())),
                _ => Ok((Fields::new(), Vec::new())),
            }
        }
        BodyKind::Form => {
            let request = rebuild(headers, bytes)?;
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok((fields_from_pairs(pairs), Vec::new()))
        }
        BodyKind::Multipart => read_multipart(rebuild(headers, bytes)?).await,
        BodyKind::Other => Ok((Fields::new(), Vec::new())),
    }
}

fn rebuild(headers: &HeaderMap, bytes: bytes::Bytes) -> Result<Request, ApiError> {
    // Form bodies are only read from non-GET requests.
    let mut builder = Request::builder().method(Method::POST);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder
        .body(Body::from(bytes))
        .map_err(|e| ApiError::InternalServer(format!("failed to rebuild request: {}", e)))
}

async fn read_multipart(request: Request) -> Result<(Fields, Vec<FileAttachment>), ApiError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut fields = Fields::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                debug!(field = %name, file_name = %file_name, size = data.len(), "Received file part");
                files.push(FileAttachment::new(name, content_type, file_name, data));
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                push_field(&mut fields, name, Value::String(text));
            }
        }
    }

    Ok((fields, files))
}
