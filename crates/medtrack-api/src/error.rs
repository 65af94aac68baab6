//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use medtrack_core::{FieldError, ServiceError, ValidationErrors};

/// JSON body of every error response.
///
/// `path` and `method` are filled in by [`crate::middleware::render_errors`],
/// which is the only place that knows the request line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Server-side detail for the log line; never serialized.
    #[serde(skip)]
    pub detail: Option<String>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("Cannot {method} {path}")]
    RouteNotFound { method: String, path: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the response body. Internal detail stays out of `message`.
    pub fn body(self) -> ErrorBody {
        let status_code = self.status().as_u16();
        let (message, errors, detail) = match self {
            ApiError::Validation(errors) => (
                "Validation failed".to_string(),
                Some(errors.into_errors()),
                None,
            ),
            ApiError::NotFound(message) => (message, None, None),
            err @ ApiError::RouteNotFound { .. } => (err.to_string(), None, None),
            ApiError::Internal(detail) => {
                ("Internal server error".to_string(), None, Some(detail))
            }
        };

        ErrorBody {
            status_code,
            message,
            errors,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            path: None,
            method: None,
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => ApiError::Validation(errors),
            err @ ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            err @ (ServiceError::Database(_) | ServiceError::LockPoisoned(_)) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
