use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::RiskOutcome;

/// A stored risk prediction. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub risk_score: f64,
    pub outcome: RiskOutcome,
    pub follow_up: String,
    pub created_at: NaiveDateTime,
}

/// Prediction joined with the owning patient's name (alert resend, detail view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionWithPatient {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub patient_name: String,
}

/// Input for appending a prediction to a (possibly new) patient.
#[derive(Debug, Clone)]
pub struct NewPrediction<'a> {
    pub patient_name: &'a str,
    pub patient_age: i64,
    pub risk_score: f64,
    pub outcome: RiskOutcome,
    pub follow_up: &'a str,
}
