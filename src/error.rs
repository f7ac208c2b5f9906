// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::config::CATALOG_PATH;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error (failed database writes, corrupt rows)
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate email or pack title)
    Conflict(String),

    // 400 Bad Request: the quiz answer key is gone, the quiz must be restarted
    SessionExpired(String),

    // 422 Unprocessable Entity: the pack has nothing to play
    EmptyContent(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Every failure is rendered as `{"success": false, "message": ...}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut redirect_url = None;
        let (status, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong on our side. Please try again.".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::SessionExpired(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::EmptyContent(msg) => {
                redirect_url = Some(CATALOG_PATH);
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
        };

        let body = match redirect_url {
            Some(url) => json!({ "success": false, "message": message, "redirect_url": url }),
            None => json!({ "success": false, "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Malformed or mistyped JSON bodies are the caller's fault.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Maps a unique-constraint violation to `Conflict`, anything else to a 500.
pub fn conflict_or_internal(err: sqlx::Error, conflict_message: String) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(conflict_message)
        }
        _ => AppError::from(err),
    }
}
