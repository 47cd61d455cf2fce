use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;

use crate::forms::GroupErrors;

/// Errors produced by the review engine itself, below the HTTP layer.
///
/// Validation failures are not part of this enum: form groups collect those
/// into a [`GroupErrors`] value and report them through `errors()` rather
/// than raising them. Everything here is either a configuration fault, a
/// refused operation, or an infrastructure failure.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("Ambiguous kind registration: {0}")]
    AmbiguousKind(String),
    #[error("{0}")]
    QuotaExceeded(String),
    #[error("{0}")]
    DependencyConflict(String),
    #[error("Validation failed")]
    Validation(GroupErrors),
    #[error("Storage error: {0}")]
    Infrastructure(#[from] anyhow::Error),
}

impl From<diesel::result::Error> for EngineError {
    fn from(err: diesel::result::Error) -> Self {
        EngineError::Infrastructure(err.into())
    }
}

impl From<r2d2::Error> for EngineError {
    fn from(err: r2d2::Error) -> Self {
        EngineError::Infrastructure(err.into())
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Not found")]
    NotFound,
    #[error("Validation failed")]
    Validation(GroupErrors),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    QuotaExceeded(String),
    #[error("{0}")]
    DependencyConflict(String),
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownKind(kind) => ApiError::UnknownKind(kind),
            EngineError::AmbiguousKind(kind) => {
                ApiError::Database(anyhow::anyhow!("Ambiguous kind registration: {}", kind))
            }
            EngineError::QuotaExceeded(msg) => ApiError::QuotaExceeded(msg),
            EngineError::DependencyConflict(msg) => ApiError::DependencyConflict(msg),
            EngineError::Validation(errors) => ApiError::Validation(errors),
            EngineError::Infrastructure(err) => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Validation failures carry structured per-field messages and get
        // their own body shape; every other kind reports a single message.
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "errors": errors }),
            ),
            ApiError::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": err.to_string() }),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": "Not found" }),
            ),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, serde_json::json!({ "error": msg }))
            }
            ApiError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, serde_json::json!({ "error": msg }))
            }
            ApiError::QuotaExceeded(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            ApiError::DependencyConflict(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            ApiError::UnknownKind(kind) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("Unknown kind: {}", kind) }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
