//! Application error taxonomy and HTTP mapping.
//!
//! Every fallible operation in the crate returns [`AppError`]. The enum is
//! closed and matched exhaustively in [`IntoResponse`], so each variant has
//! exactly one HTTP rendering:
//!
//! | Variant        | Status | Body code          |
//! |----------------|--------|--------------------|
//! | `Validation`   | 400    | `validation_error` |
//! | `Unauthorized` | 401    | `unauthorized`     |
//! | `NotFound`     | 404    | `not_found`        |
//! | `Collision`    | 500    | `internal_error`   |
//! | `MetricsWrite` | 500    | `internal_error`   |
//! | `Store`        | 500    | `internal_error`   |
//!
//! `Collision` is rendered as a generic 500: a truncated-digest collision is
//! a systemic anomaly the client can retry, not a client error, and the body
//! must not leak which code was taken. `MetricsWrite` is normally swallowed
//! (logged) inside the redirect path and only reaches the boundary from
//! direct metrics operations.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("short code collision: {message}")]
    Collision { message: String, details: Value },

    #[error("metrics write failed: {message}")]
    MetricsWrite { message: String, details: Value },

    #[error("{message}")]
    Store { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn collision(message: impl Into<String>, details: Value) -> Self {
        Self::Collision {
            message: message.into(),
            details,
        }
    }

    pub fn metrics_write(message: impl Into<String>, details: Value) -> Self {
        Self::MetricsWrite {
            message: message.into(),
            details,
        }
    }

    pub fn store(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::Unauthorized { message, details } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, details)
            }
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Collision { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
                json!({}),
            ),
            AppError::MetricsWrite { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
            AppError::Store { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();

        // RFC 6750: 401 responses carry a challenge header.
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "database error");
        AppError::store("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(&e).unwrap_or_else(|_| json!({})),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_message() {
        let err = AppError::bad_request("Invalid URL", json!({}));
        assert_eq!(err.to_string(), "Invalid URL");
    }

    #[test]
    fn test_collision_display_is_tagged() {
        let err = AppError::collision("code taken", json!({ "code": "abc123" }));
        assert!(err.to_string().contains("collision"));
    }

    #[test]
    fn test_validation_errors_convert_to_bad_request() {
        let errors = validator::ValidationErrors::new();
        let err: AppError = errors.into();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
