//! Typed request failures and their HTTP mapping.
//!
//! Business-rule checks terminate the request with one of these variants;
//! nothing is retried automatically. Storage failures surface as `Internal`
//! with a generic message — the detail goes to the log, not the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input. No state mutation was attempted.
    Validation(String),
    /// Referenced entity absent (item, task, session, singleton state).
    NotFound(String),
    /// A business rule refused the action; message names the rule.
    Precondition(String),
    /// Adapter/storage failure. Logged; caller gets a generic message.
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        ApiError::Precondition(msg.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "validation failed: {msg}"),
            ApiError::NotFound(msg) => write!(f, "not found: {msg}"),
            ApiError::Precondition(msg) => write!(f, "precondition failed: {msg}"),
            ApiError::Internal(err) => write!(f, "internal error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

/// JSON error envelope returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// "validation" | "not_found" | "precondition" | "internal"
    pub kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Precondition(msg) => (StatusCode::BAD_REQUEST, "precondition", msg.clone()),
            ApiError::Internal(err) => {
                error!(error = %err, "request failed on storage/internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                kind,
            }),
        )
            .into_response()
    }
}
