//! Labeled key/value scraping for free-text reports.
//!
//! The text is lowercased, then each field's pattern is searched across
//! the whole document; the first match wins. Fields the table does not
//! cover are filled from [`REPORT_DEFAULTS`].

use std::sync::LazyLock;

use regex::Regex;

use super::types::{FeatureRecord, FieldValue, SYMPTOM_COLUMNS};
use super::ReportError;

/// How a captured value is turned into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Text,
    Integer,
    /// "true"/"1" → 1, anything else → 0
    Flag,
}

struct FieldPattern {
    field: &'static str,
    regex: Regex,
    capture: Capture,
}

static FIELD_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        pattern("patient_name", r"patient name\s*[:\-\s]\s*([a-z][a-z \t]*)", Capture::Text),
        pattern("age", r"age\s*[:\-\s]\s*(\d+)", Capture::Integer),
        pattern("sex", r"sex\s*[:\-\s]\s*(male|female)", Capture::Text),
        pattern("cp", r"chest pain type\s*[:\-\s]\s*(\w+)", Capture::Text),
        pattern("trestbps", r"resting bp\s*[:\-\s]\s*(\d+)", Capture::Integer),
        pattern("chol", r"cholesterol\s*[:\-\s]\s*(\d+)", Capture::Integer),
        pattern(
            "fbs",
            r"fasting blood sugar > 120\s*[:\-\s]\s*(true|false|1|0)",
            Capture::Flag,
        ),
        pattern("thalch", r"max heart rate\s*[:\-\s]\s*(\d+)", Capture::Integer),
        pattern("exang", r"exercise angina\s*[:\-\s]\s*(true|false|1|0)", Capture::Flag),
        pattern(
            "clinician_email",
            r"clinician email\s*[:\-\s]\s*([\w.\-]+@[\w.\-]+)",
            Capture::Text,
        ),
    ]
});

fn pattern(field: &'static str, regex_str: &str, capture: Capture) -> FieldPattern {
    FieldPattern {
        field,
        regex: Regex::new(regex_str).expect("Invalid report field pattern"),
        capture,
    }
}

/// Default cell for columns reports usually omit.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Text(&'static str),
    Number(f64),
}

impl From<DefaultValue> for FieldValue {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Text(s) => FieldValue::Text(s.to_string()),
            DefaultValue::Number(n) => FieldValue::Number(n),
        }
    }
}

/// Columns filled when absent or null after extraction.
pub const REPORT_DEFAULTS: [(&str, DefaultValue); 9] = [
    ("restecg", DefaultValue::Text("normal")),
    ("oldpeak", DefaultValue::Number(1.0)),
    ("slope", DefaultValue::Text("flat")),
    ("ca", DefaultValue::Number(0.0)),
    ("thal", DefaultValue::Text("normal")),
    (SYMPTOM_COLUMNS[0], DefaultValue::Number(0.0)),
    (SYMPTOM_COLUMNS[1], DefaultValue::Number(0.0)),
    (SYMPTOM_COLUMNS[2], DefaultValue::Number(0.0)),
    (SYMPTOM_COLUMNS[3], DefaultValue::Number(0.0)),
];

/// Fill every [`REPORT_DEFAULTS`] column that is missing.
pub fn apply_defaults(record: &mut FeatureRecord) {
    for (column, value) in REPORT_DEFAULTS {
        record.fill_default(column, value);
    }
}

/// Scrape every labeled field from report text. Unmatched fields are null.
/// Does not apply defaults.
pub fn extract_fields(text: &str) -> FeatureRecord {
    let text = text.to_lowercase();
    let mut record = FeatureRecord::new();

    for field in FIELD_PATTERNS.iter() {
        let value = field
            .regex
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| convert(m.as_str().trim(), field.capture))
            .unwrap_or(FieldValue::Null);
        record.set(field.field, value);
    }

    record
}

fn convert(raw: &str, capture: Capture) -> FieldValue {
    match capture {
        Capture::Text => FieldValue::Text(raw.to_string()),
        Capture::Integer => raw
            .parse::<i64>()
            .map(FieldValue::from)
            .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
        Capture::Flag => FieldValue::from(matches!(raw, "true" | "1")),
    }
}

/// Full text → record transform: scrape, default, then require age.
pub fn parse_report_text(text: &str) -> Result<FeatureRecord, ReportError> {
    let mut record = extract_fields(text);
    apply_defaults(&mut record);

    if record.is_missing("age") {
        return Err(ReportError::MissingAge);
    }

    Ok(record)
}
