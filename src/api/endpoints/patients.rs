//! Patient history endpoints.
//!
//! - `GET /patients`: every patient with a prediction count
//! - `GET /patients/:id`: one patient and its predictions, oldest first
//! - `GET /predictions/:id`: one prediction with the patient's name

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::{PatientHistory, PatientSummary, PredictionWithPatient};

#[derive(Serialize)]
pub struct PatientListResponse {
    pub patients: Vec<PatientSummary>,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid ID format".into()))
}

/// `GET /patients`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<PatientListResponse>, ApiError> {
    let patients = ctx
        .blocking(|core| {
            let conn = core.lock_db()?;
            Ok(repository::list_patients(&conn)?)
        })
        .await?;
    Ok(Json(PatientListResponse { patients }))
}

/// `GET /patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientHistory>, ApiError> {
    let id = parse_id(&patient_id)?;
    let history = ctx
        .blocking(move |core| {
            let conn = core.lock_db()?;
            Ok(repository::get_patient_history(&conn, &id)?)
        })
        .await?;
    history
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))
}

/// `GET /predictions/:id`
pub async fn prediction(
    State(ctx): State<ApiContext>,
    Path(prediction_id): Path<String>,
) -> Result<Json<PredictionWithPatient>, ApiError> {
    let id = parse_id(&prediction_id)?;
    let stored = ctx
        .blocking(move |core| {
            let conn = core.lock_db()?;
            Ok(repository::get_prediction_with_patient(&conn, &id)?)
        })
        .await?;
    stored
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Prediction not found".into()))
}
