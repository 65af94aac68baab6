//! Route handlers, one module per resource.

pub mod assignments;
pub mod health;
pub mod medications;
pub mod patients;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::http::{Method, Uri};
use axum::Json;
use serde_json::Value;

use medtrack_core::{MedTrack, ServiceResult, ValidationErrors};

use crate::error::ApiError;

/// Resolve an `:id` path segment; it must be a positive integer.
pub(crate) fn record_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    match path {
        Ok(Path(id)) if id > 0 => Ok(id),
        _ => Err(ValidationErrors::single("id", "ID must be a positive integer").into()),
    }
}

/// Unwrap a JSON body; a malformed one is a validation failure on `body`.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "rejected request body");
            Err(ValidationErrors::single("body", "Request body must be a JSON object").into())
        }
    }
}

/// Run a service call on the blocking pool; SQLite calls hold a mutex.
pub(crate) async fn blocking<T, F>(records: MedTrack, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&MedTrack) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&records))
        .await
        .map_err(|e| ApiError::Internal(format!("service task failed: {e}")))?
        .map_err(ApiError::from)
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
