use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use medtrack_core::{Medication, MedicationDetail};

use super::{blocking, json_body, record_id};
use crate::error::ApiError;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    let body = json_body(body)?;
    let medication = blocking(state.records, move |r| r.create_medication(&body)).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicationDetail>>, ApiError> {
    Ok(Json(blocking(state.records, |r| r.find_all_medications()).await?))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MedicationDetail>, ApiError> {
    let id = record_id(path)?;
    Ok(Json(blocking(state.records, move |r| r.find_medication(id)).await?))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Medication>, ApiError> {
    let id = record_id(path)?;
    let body = json_body(body)?;
    let medication = blocking(state.records, move |r| r.update_medication(id, &body)).await?;
    Ok(Json(medication))
}

pub async fn remove(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(path)?;
    blocking(state.records, move |r| r.remove_medication(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
