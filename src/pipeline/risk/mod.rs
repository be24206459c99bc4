//! Risk classifier adapter: serialized pipeline artifact, tiers, and the
//! assess step that turns a feature record into a labelled score.

pub mod model;
pub mod tiers;

pub use model::{PipelineArtifact, PipelineModel};
pub use tiers::{follow_up_for, outcome_for, should_notify};

use serde::Serialize;
use thiserror::Error;

use crate::models::enums::RiskOutcome;
use crate::pipeline::report::{FeatureRecord, SYMPTOM_COLUMNS};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Cannot read classifier artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed classifier artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported classifier artifact version {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid classifier artifact: {0}")]
    Invalid(String),

    #[error("Classifier produced an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Probability of the positive (high-risk) class for one record.
pub trait RiskModel: Send + Sync {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError>;

    /// Columns the model reads. Used only for diagnostics.
    fn input_columns(&self) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub outcome: RiskOutcome,
    pub follow_up: String,
}

impl RiskAssessment {
    pub fn from_score(risk_score: f64) -> Self {
        Self {
            risk_score,
            outcome: outcome_for(risk_score),
            follow_up: follow_up_for(risk_score).to_string(),
        }
    }
}

/// Add any missing symptom flag as 0.
pub fn ensure_symptom_columns(record: &mut FeatureRecord) {
    for column in SYMPTOM_COLUMNS {
        record.fill_default(column, 0_i64);
    }
}

/// Score one record and derive its labels.
pub fn assess(model: &dyn RiskModel, record: &FeatureRecord) -> Result<RiskAssessment, ModelError> {
    let mut record = record.clone();
    ensure_symptom_columns(&mut record);

    let missing: Vec<String> = model
        .input_columns()
        .into_iter()
        .filter(|c| record.is_missing(c))
        .collect();
    if !missing.is_empty() {
        tracing::debug!(?missing, "Imputing missing classifier inputs");
    }

    let risk_score = model.predict_proba(&record)?;
    if !risk_score.is_finite() || !(0.0..=1.0).contains(&risk_score) {
        return Err(ModelError::InvalidProbability(risk_score));
    }

    let assessment = RiskAssessment::from_score(risk_score);
    tracing::debug!(
        risk_score,
        outcome = %assessment.outcome,
        "Risk assessed"
    );
    Ok(assessment)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed score and remembers the last record it saw.
    pub(crate) struct FixedModel {
        pub score: f64,
        pub seen: Mutex<Option<FeatureRecord>>,
    }

    impl FixedModel {
        pub(crate) fn new(score: f64) -> Self {
            Self {
                score,
                seen: Mutex::new(None),
            }
        }
    }

    impl RiskModel for FixedModel {
        fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
            *self.seen.lock().unwrap() = Some(record.clone());
            Ok(self.score)
        }
    }

    #[test]
    fn assess_labels_score() {
        let model = FixedModel::new(0.85);
        let assessment = assess(&model, &FeatureRecord::new()).unwrap();
        assert_eq!(assessment.risk_score, 0.85);
        assert_eq!(assessment.outcome, RiskOutcome::HighRisk);
        assert_eq!(assessment.follow_up, "CRITICAL: Immediate attention required.");
    }

    #[test]
    fn assess_fills_symptom_flags_without_touching_input() {
        let model = FixedModel::new(0.2);
        let mut record = FeatureRecord::new();
        record.set("symptom_dizziness", 1_i64);

        assess(&model, &record).unwrap();

        let seen = model.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.number("symptom_chest_pain"), Some(0.0));
        assert_eq!(seen.number("symptom_dizziness"), Some(1.0));
        assert!(!record.contains("symptom_chest_pain"));
    }

    #[test]
    fn assess_rejects_out_of_range_probability() {
        for bad in [1.2, -0.1, f64::NAN] {
            let model = FixedModel::new(bad);
            assert!(matches!(
                assess(&model, &FeatureRecord::new()),
                Err(ModelError::InvalidProbability(_))
            ));
        }
    }

    #[test]
    fn low_score_is_routine() {
        let assessment = RiskAssessment::from_score(0.12);
        assert_eq!(assessment.outcome, RiskOutcome::LowRisk);
        assert_eq!(assessment.follow_up, "Routine check-up in 6 months.");
    }
}
