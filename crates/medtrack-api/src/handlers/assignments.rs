//! `/assignments` handlers, including the remaining-days view.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use medtrack_core::{Assignment, AssignmentDetail};

use super::{blocking, json_body, record_id};
use crate::error::ApiError;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let body = json_body(body)?;
    let assignment = blocking(state.records, move |r| r.create_assignment(&body)).await?;
    tracing::debug!(
        id = assignment.id,
        patient_id = assignment.patient_id,
        medication_id = assignment.medication_id,
        "created assignment"
    );
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentDetail>>, ApiError> {
    Ok(Json(blocking(state.records, |r| r.find_all_assignments()).await?))
}

/// Every assignment with `remainingDays` and `status` as of now.
pub async fn with_remaining_days(
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentDetail>>, ApiError> {
    let rows = blocking(state.records, |r| r.find_all_with_remaining_days()).await?;
    Ok(Json(rows))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<AssignmentDetail>, ApiError> {
    let id = record_id(path)?;
    Ok(Json(blocking(state.records, move |r| r.find_assignment(id)).await?))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Assignment>, ApiError> {
    let id = record_id(path)?;
    let body = json_body(body)?;
    let assignment = blocking(state.records, move |r| r.update_assignment(id, &body)).await?;
    Ok(Json(assignment))
}

pub async fn remove(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(path)?;
    blocking(state.records, move |r| r.remove_assignment(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
