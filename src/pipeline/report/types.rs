use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name used when a report carries no usable patient name.
pub const UNNAMED_PATIENT: &str = "Unnamed Patient";

/// Symptom flag columns the classifier always expects.
pub const SYMPTOM_COLUMNS: [&str; 4] = [
    "symptom_chest_pain",
    "symptom_shortness_of_breath",
    "symptom_dizziness",
    "symptom_fatigue",
];

/// A single cell of the one-row feature frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Null, or a number that is NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(_) => false,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Number(if value { 1.0 } else { 0.0 })
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Single-row record of classifier input columns, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Absent column, null cell, or NaN.
    pub fn is_missing(&self, column: &str) -> bool {
        self.fields.get(column).map_or(true, FieldValue::is_missing)
    }

    /// Set `column` only when it is missing.
    pub fn fill_default(&mut self, column: &str, value: impl Into<FieldValue>) {
        if self.is_missing(column) {
            self.set(column, value);
        }
    }

    /// Numeric view of a cell. Text that parses as a number counts.
    pub fn number(&self, column: &str) -> Option<f64> {
        match self.fields.get(column)? {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Categorical view of a cell. Numbers are rendered in their shortest form.
    pub fn category(&self, column: &str) -> Option<String> {
        match self.fields.get(column)? {
            FieldValue::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            FieldValue::Number(n) if n.is_finite() => Some(n.to_string()),
            _ => None,
        }
    }

    fn non_empty_text(&self, column: &str) -> Option<&str> {
        match self.fields.get(column)? {
            FieldValue::Text(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    pub fn patient_name(&self) -> String {
        self.non_empty_text("patient_name")
            .unwrap_or(UNNAMED_PATIENT)
            .to_string()
    }

    pub fn clinician_email(&self) -> Option<String> {
        self.non_empty_text("clinician_email").map(str::to_string)
    }

    /// Age truncated to whole years.
    pub fn age(&self) -> Option<i64> {
        self.number("age").map(|a| a.trunc() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_covers_absent_null_and_nan() {
        let mut record = FeatureRecord::new();
        record.set("a", FieldValue::Null);
        record.set("b", f64::NAN);
        record.set("c", 0.0);
        assert!(record.is_missing("a"));
        assert!(record.is_missing("b"));
        assert!(!record.is_missing("c"));
        assert!(record.is_missing("zzz"));
    }

    #[test]
    fn fill_default_keeps_present_values() {
        let mut record = FeatureRecord::new();
        record.set("ca", 2_i64);
        record.fill_default("ca", 0_i64);
        record.fill_default("restecg", "normal");
        assert_eq!(record.number("ca"), Some(2.0));
        assert_eq!(record.category("restecg").as_deref(), Some("normal"));
    }

    #[test]
    fn patient_name_falls_back_when_blank() {
        let mut record = FeatureRecord::new();
        assert_eq!(record.patient_name(), UNNAMED_PATIENT);
        record.set("patient_name", "   ");
        assert_eq!(record.patient_name(), UNNAMED_PATIENT);
        record.set("patient_name", " Jane Doe ");
        assert_eq!(record.patient_name(), "Jane Doe");
    }

    #[test]
    fn numeric_text_is_readable_as_number() {
        let mut record = FeatureRecord::new();
        record.set("age", "57");
        assert_eq!(record.age(), Some(57));
        record.set("age", "unknown");
        assert_eq!(record.age(), None);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut record = FeatureRecord::new();
        record.set("age", 60_i64);
        record.set("sex", "male");
        record.set("thal", FieldValue::Null);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"age": 60.0, "sex": "male", "thal": null}));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(FieldValue::from(None::<f64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(true)), FieldValue::Number(1.0));
    }
}
