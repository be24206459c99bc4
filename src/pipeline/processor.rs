//! Prediction orchestrator.
//!
//! Every entry point (form, report upload) funnels through
//! [`process_prediction`]: assess → conditional alert → persist.
//! Functions here block (SQLite, SMTP); async callers wrap them in
//! `spawn_blocking`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core_state::{CoreError, CoreState};
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::NewPrediction;
use crate::pipeline::report::{apply_defaults, FeatureRecord, ReportError};
use crate::pipeline::risk::{self, should_notify, ModelError, RiskAssessment};

/// Stored age for a patient whose record carries none.
pub const DEFAULT_PATIENT_AGE: i64 = 50;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("{0}")]
    Report(#[from] ReportError),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// Everything needed to score, alert and store one prediction.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub record: FeatureRecord,
    pub patient_name: String,
    pub clinician_email: Option<String>,
    pub patient_age: Option<i64>,
}

impl PredictionRequest {
    /// Take name, e-mail and age from the record itself (report uploads).
    pub fn from_record(record: FeatureRecord) -> Self {
        Self {
            patient_name: record.patient_name(),
            clinician_email: record.clinician_email(),
            patient_age: record.age(),
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub risk_score: f64,
    pub outcome: crate::models::RiskOutcome,
    pub follow_up: String,
    pub prediction_id: Uuid,
    pub email_found_and_sent: bool,
    pub patient_name: String,
    pub message: String,
}

/// Symptom-only quick check.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SymptomInput {
    pub symptom_chest_pain: bool,
    pub symptom_shortness_of_breath: bool,
    pub symptom_dizziness: bool,
    pub symptom_fatigue: bool,
}

impl SymptomInput {
    /// The four flags plus the report default table. Clinical columns stay
    /// absent so the classifier's fitted imputers supply them.
    pub fn to_record(self) -> FeatureRecord {
        let mut record = FeatureRecord::new();
        record.set("symptom_chest_pain", self.symptom_chest_pain);
        record.set("symptom_shortness_of_breath", self.symptom_shortness_of_breath);
        record.set("symptom_dizziness", self.symptom_dizziness);
        record.set("symptom_fatigue", self.symptom_fatigue);
        apply_defaults(&mut record);
        record
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Score the record, alert the clinician when warranted, then store the
/// prediction under the named patient.
pub fn process_prediction(
    state: &CoreState,
    request: PredictionRequest,
) -> Result<PredictionReport, ProcessError> {
    let assessment = risk::assess(state.model(), &request.record)?;

    let recipient = request
        .clinician_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let email_sent = match recipient {
        Some(email) if should_notify(assessment.risk_score, Some(email)) => {
            state
                .alerts()
                .send_alert(email, &request.patient_name, assessment.risk_score)
        }
        _ => false,
    };

    let (patient, prediction) = {
        let mut conn = state.lock_db()?;
        repository::record_prediction(
            &mut conn,
            &NewPrediction {
                patient_name: &request.patient_name,
                patient_age: request.patient_age.unwrap_or(DEFAULT_PATIENT_AGE),
                risk_score: assessment.risk_score,
                outcome: assessment.outcome,
                follow_up: &assessment.follow_up,
            },
        )?
    };

    let message = match (email_sent, recipient) {
        (true, Some(email)) => format!("Alert sent to {email}"),
        _ => "No alert sent.".to_string(),
    };

    tracing::info!(
        prediction_id = %prediction.id,
        patient_id = %patient.id,
        risk_score = assessment.risk_score,
        outcome = %assessment.outcome,
        email_sent,
        "Prediction processed"
    );

    Ok(PredictionReport {
        risk_score: assessment.risk_score,
        outcome: assessment.outcome,
        follow_up: assessment.follow_up,
        prediction_id: prediction.id,
        email_found_and_sent: email_sent,
        patient_name: patient.name,
        message,
    })
}

/// Symptom-only assessment. Nothing is stored and no alert is sent.
pub fn assess_symptoms(state: &CoreState, input: SymptomInput) -> Result<RiskAssessment, ProcessError> {
    Ok(risk::assess(state.model(), &input.to_record())?)
}

/// Re-send the alert for a stored prediction using its stored score.
pub fn resend_alert(state: &CoreState, prediction_id: &Uuid, email: &str) -> Result<bool, ProcessError> {
    let stored = {
        let conn = state.lock_db()?;
        repository::get_prediction_with_patient(&conn, prediction_id)?
    };
    let stored = stored.ok_or_else(|| ProcessError::NotFound {
        entity: "Prediction",
        id: prediction_id.to_string(),
    })?;

    let sent = state
        .alerts()
        .send_alert(email, &stored.patient_name, stored.prediction.risk_score);
    tracing::info!(%prediction_id, sent, "Manual alert requested");
    Ok(sent)
}
