use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Envelope returned for every failed request. Internal detail never leaks
/// here; operators correlate via the `x-request-id` header in the logs.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Bad request carrying structured context, e.g. the id of an existing
    /// pending reactivation request.
    BadRequestDetailed(String, Value),
    Validation(Vec<String>),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// Account is lockout-locked; message carries the remaining time.
    Locked(String),
    RateLimited(String),
    /// An update matched zero rows when exactly one was expected. The open
    /// transaction must be rolled back by the caller returning this error.
    Integrity(String),
    InternalServerError(anyhow::Error),
    ServiceUnavailable(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code, details) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST".to_string(), None)
            }
            AppError::BadRequestDetailed(msg, details) => (
                StatusCode::BAD_REQUEST,
                msg,
                "BAD_REQUEST".to_string(),
                Some(details),
            ),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                msg,
                "UNAUTHORIZED".to_string(),
                None,
            ),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, msg, "FORBIDDEN".to_string(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND".to_string(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT".to_string(), None),
            AppError::Locked(msg) => (StatusCode::LOCKED, msg, "LOCKED".to_string(), None),
            AppError::RateLimited(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                msg,
                "RATE_LIMITED".to_string(),
                None,
            ),
            AppError::Integrity(detail) => {
                tracing::error!("Integrity error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTEGRITY_ERROR".to_string(),
                    None,
                )
            }
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
            AppError::ServiceUnavailable(err) => {
                tracing::error!("Dependency unavailable: {:?}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                    "SERVICE_UNAVAILABLE".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::ServiceUnavailable(err.into())
            }
            _ => AppError::InternalServerError(err.into()),
        }
    }
}
