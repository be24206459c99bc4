use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prediction::Prediction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    pub created_at: NaiveDateTime,
}

/// Patient row plus the number of predictions it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    pub prediction_count: i64,
}

/// A patient with its predictions in the order they were appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientHistory {
    pub patient: Patient,
    pub predictions: Vec<Prediction>,
}
