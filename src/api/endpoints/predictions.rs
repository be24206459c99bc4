//! Prediction endpoints.
//!
//! Three entry points share the processor:
//! - `POST /predict-from-form`: full clinical feature set as JSON
//! - `POST /predict-from-symptoms`: four symptom flags, not stored
//! - `POST /predict-with-report`: multipart CSV or PDF upload

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::processor::{
    self, PredictionReport, PredictionRequest, ProcessError, SymptomInput,
};
use crate::pipeline::report::{self, FeatureRecord, ReportKind, SYMPTOM_COLUMNS};
use crate::pipeline::risk::RiskAssessment;

/// Multipart field carrying the uploaded report.
pub const REPORT_FIELD: &str = "report_file";

const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload a CSV or PDF.";

fn anonymous() -> String {
    "Anonymous".to_string()
}

/// Form submission: every clinical column plus optional symptom flags.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientDataInput {
    pub age: i64,
    pub sex: String,
    pub cp: String,
    pub trestbps: i64,
    pub chol: i64,
    pub fbs: bool,
    pub restecg: String,
    pub thalch: i64,
    pub exang: bool,
    pub oldpeak: f64,
    pub slope: String,
    pub ca: i64,
    pub thal: String,
    #[serde(default = "anonymous")]
    pub patient_name: String,
    #[serde(default)]
    pub symptom_chest_pain: i64,
    #[serde(default)]
    pub symptom_shortness_of_breath: i64,
    #[serde(default)]
    pub symptom_dizziness: i64,
    #[serde(default)]
    pub symptom_fatigue: i64,
    #[serde(default)]
    pub clinician_email: Option<String>,
}

impl PatientDataInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=120).contains(&self.age) {
            return Err(ApiError::BadRequest("age must be between 1 and 120".into()));
        }
        for (field, value) in [
            ("trestbps", self.trestbps),
            ("chol", self.chol),
            ("thalch", self.thalch),
        ] {
            if value <= 0 {
                return Err(ApiError::BadRequest(format!("{field} must be positive")));
            }
        }
        if !self.oldpeak.is_finite() || self.oldpeak < 0.0 {
            return Err(ApiError::BadRequest("oldpeak must be non-negative".into()));
        }
        if self.ca < 0 {
            return Err(ApiError::BadRequest("ca must be non-negative".into()));
        }
        for (field, value) in SYMPTOM_COLUMNS.iter().zip(self.symptom_flags()) {
            if value != 0 && value != 1 {
                return Err(ApiError::BadRequest(format!("{field} must be 0 or 1")));
            }
        }
        Ok(())
    }

    fn symptom_flags(&self) -> [i64; 4] {
        [
            self.symptom_chest_pain,
            self.symptom_shortness_of_breath,
            self.symptom_dizziness,
            self.symptom_fatigue,
        ]
    }

    pub fn into_request(self) -> PredictionRequest {
        let mut record = FeatureRecord::new();
        record.set("age", self.age);
        record.set("sex", self.sex.as_str());
        record.set("cp", self.cp.as_str());
        record.set("trestbps", self.trestbps);
        record.set("chol", self.chol);
        record.set("fbs", self.fbs);
        record.set("restecg", self.restecg.as_str());
        record.set("thalch", self.thalch);
        record.set("exang", self.exang);
        record.set("oldpeak", self.oldpeak);
        record.set("slope", self.slope.as_str());
        record.set("ca", self.ca);
        record.set("thal", self.thal.as_str());
        for (column, value) in SYMPTOM_COLUMNS.iter().zip(self.symptom_flags()) {
            record.set(*column, value);
        }

        let patient_name = match self.patient_name.trim() {
            "" => anonymous(),
            name => name.to_string(),
        };

        PredictionRequest {
            record,
            patient_name,
            clinician_email: self.clinician_email,
            patient_age: Some(self.age),
        }
    }
}

/// `POST /predict-from-form`: score, alert when warranted, store.
pub async fn from_form(
    State(ctx): State<ApiContext>,
    Json(input): Json<PatientDataInput>,
) -> Result<Json<PredictionReport>, ApiError> {
    input.validate()?;
    let request = input.into_request();

    let report = ctx
        .blocking(move |core| Ok(processor::process_prediction(core, request)?))
        .await?;
    Ok(Json(report))
}

/// `POST /predict-from-symptoms`: quick check, nothing stored.
pub async fn from_symptoms(
    State(ctx): State<ApiContext>,
    Json(input): Json<SymptomInput>,
) -> Result<Json<RiskAssessment>, ApiError> {
    let assessment = processor::assess_symptoms(&ctx.core, input)?;
    Ok(Json(assessment))
}

/// `POST /predict-with-report`: parse an uploaded CSV or PDF, then
/// score, alert and store like the form path.
pub async fn with_report(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<PredictionReport>, ApiError> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(REPORT_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {e}")))?;
        upload = Some((content_type, bytes.to_vec()));
        break;
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest(format!("Missing '{REPORT_FIELD}' field")))?;
    let kind = content_type
        .as_deref()
        .and_then(ReportKind::from_content_type)
        .ok_or_else(|| ApiError::BadRequest(INVALID_FILE_TYPE.into()))?;

    tracing::info!(kind = kind.as_str(), bytes = bytes.len(), "Report received");

    let report = ctx
        .blocking(move |core| {
            let record = report::parse_report(kind, &bytes).map_err(processing)?;
            processor::process_prediction(core, PredictionRequest::from_record(record))
                .map_err(processing)
        })
        .await?;
    Ok(Json(report))
}

/// Any report-path failure is answered as a processing error.
fn processing(err: impl Into<ProcessError>) -> ApiError {
    ApiError::Processing(err.into().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_json() -> serde_json::Value {
        serde_json::json!({
            "age": 52, "sex": "male", "cp": "asymptomatic", "trestbps": 125,
            "chol": 212, "fbs": true, "restecg": "normal", "thalch": 168,
            "exang": false, "oldpeak": 1.0, "slope": "upsloping", "ca": 2,
            "thal": "reversable defect"
        })
    }

    fn parse(value: serde_json::Value) -> PatientDataInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn form_defaults_apply() {
        let input = parse(form_json());
        assert_eq!(input.patient_name, "Anonymous");
        assert_eq!(input.symptom_fatigue, 0);
        assert!(input.clinician_email.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn form_rejects_out_of_range_values() {
        let cases = [
            ("age", serde_json::json!(0)),
            ("age", serde_json::json!(121)),
            ("trestbps", serde_json::json!(0)),
            ("chol", serde_json::json!(-5)),
            ("oldpeak", serde_json::json!(-0.5)),
            ("ca", serde_json::json!(-1)),
            ("symptom_dizziness", serde_json::json!(2)),
        ];
        for (field, value) in cases {
            let mut json = form_json();
            json[field] = value;
            assert!(
                matches!(parse(json).validate(), Err(ApiError::BadRequest(_))),
                "{field} should be rejected"
            );
        }
    }

    #[test]
    fn form_record_carries_all_columns() {
        let mut json = form_json();
        json["patient_name"] = serde_json::json!("John Doe");
        json["symptom_chest_pain"] = serde_json::json!(1);
        json["clinician_email"] = serde_json::json!("dr@clinic.test");

        let request = parse(json).into_request();
        assert_eq!(request.patient_name, "John Doe");
        assert_eq!(request.patient_age, Some(52));
        assert_eq!(request.clinician_email.as_deref(), Some("dr@clinic.test"));
        assert_eq!(request.record.number("fbs"), Some(1.0));
        assert_eq!(request.record.number("exang"), Some(0.0));
        assert_eq!(request.record.number("symptom_chest_pain"), Some(1.0));
        assert_eq!(request.record.category("thal").as_deref(), Some("reversable defect"));
        assert_eq!(request.record.len(), 17);
    }

    #[test]
    fn blank_form_name_becomes_anonymous() {
        let mut json = form_json();
        json["patient_name"] = serde_json::json!("  ");
        assert_eq!(parse(json).into_request().patient_name, "Anonymous");
    }

    #[test]
    fn missing_required_field_fails_schema() {
        let mut json = form_json();
        json.as_object_mut().unwrap().remove("thal");
        assert!(serde_json::from_value::<PatientDataInput>(json).is_err());
    }
}
