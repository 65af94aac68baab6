//! `/patients` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use medtrack_core::{Patient, PatientDetail};

use super::{blocking, json_body, record_id};
use crate::error::ApiError;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let body = json_body(body)?;
    let patient = blocking(state.records, move |r| r.create_patient(&body)).await?;
    tracing::debug!(id = patient.id, "created patient");
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PatientDetail>>, ApiError> {
    let patients = blocking(state.records, |r| r.find_all_patients()).await?;
    Ok(Json(patients))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PatientDetail>, ApiError> {
    let id = record_id(path)?;
    let patient = blocking(state.records, move |r| r.find_patient(id)).await?;
    Ok(Json(patient))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let id = record_id(path)?;
    let body = json_body(body)?;
    let patient = blocking(state.records, move |r| r.update_patient(id, &body)).await?;
    Ok(Json(patient))
}

pub async fn remove(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(path)?;
    blocking(state.records, move |r| r.remove_patient(id)).await?;
    tracing::debug!(id, "deleted patient");
    Ok(StatusCode::NO_CONTENT)
}
