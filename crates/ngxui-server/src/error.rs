// ABOUTME: Error taxonomy for the HTTP entry layer and its mapping onto JSON responses.
// ABOUTME: Every failure resolves to a per-request response; nothing here aborts the process.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Body message for every auth gate rejection.
pub const AUTH_FAIL_MESSAGE: &str = "auth fail";

/// Errors surfaced to clients by this layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing credential, rejected credential, or validator failure.
    #[error("auth fail")]
    AuthFailed,

    #[error("application shell unavailable")]
    ShellUnavailable,

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("invalid path parameter: {0}")]
    InvalidPathParam(String),

    #[error("failed to read request body")]
    BodyUnreadable,

    #[error("handler {0} is not available")]
    Unavailable(&'static str),

    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthFailed => StatusCode::FORBIDDEN,
            ApiError::ShellUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InvalidPathParam(_) | ApiError::BodyUnreadable => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// JSON shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
