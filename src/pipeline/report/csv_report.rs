use csv::{ReaderBuilder, Trim};

use super::types::{FeatureRecord, FieldValue};
use super::ReportError;

/// Cell spellings read as a missing value.
const NULL_MARKERS: [&str; 8] = ["", "na", "n/a", "nan", "null", "none", "#n/a", "?"];

/// Decode a CSV report: header row plus the first data row.
/// Extra rows are ignored; cells missing from a short row read as null.
pub fn parse_csv_report(bytes: &[u8]) -> Result<FeatureRecord, ReportError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ReportError::Encoding(e.to_string()))?;
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let row = reader.records().next().ok_or(ReportError::EmptyCsv)??;

    let mut record = FeatureRecord::new();
    for (i, column) in headers.iter().enumerate() {
        if column.is_empty() {
            continue;
        }
        record.set(column, row.get(i).map_or(FieldValue::Null, parse_cell));
    }
    Ok(record)
}

fn parse_cell(cell: &str) -> FieldValue {
    let lowered = cell.to_ascii_lowercase();
    if NULL_MARKERS.contains(&lowered.as_str()) {
        return FieldValue::Null;
    }
    match lowered.as_str() {
        "true" => return FieldValue::from(true),
        "false" => return FieldValue::from(false),
        _ => {}
    }
    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => FieldValue::Number(n),
        _ => FieldValue::Text(cell.to_string()),
    }
}
