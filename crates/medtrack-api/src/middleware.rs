//! Request-scoped middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::ErrorBody;

/// Stamp error bodies with the request line and log them once.
///
/// Handlers return [`crate::error::ApiError`], which leaves its [`ErrorBody`]
/// in the response extensions. Responses without one pass through untouched.
pub async fn render_errors(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;
    let Some(mut body) = response.extensions_mut().remove::<ErrorBody>() else {
        return response;
    };

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(
            %method,
            %path,
            status = status.as_u16(),
            detail = body.detail.as_deref().unwrap_or(""),
            "{}",
            body.message
        );
    } else {
        tracing::warn!(%method, %path, status = status.as_u16(), "{}", body.message);
    }

    body.path = Some(path);
    body.method = Some(method);
    (status, Json(body)).into_response()
}

/// Log `METHOD path - status - Nms` for every request.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        "{} {} - {} - {}ms",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
