//! Report intake: turns an uploaded CSV or PDF into a single-row
//! feature record for the classifier.

pub mod types;
pub mod fields;
pub mod pdf;
pub mod csv_report;

pub use types::*;
pub use fields::{apply_defaults, parse_report_text, REPORT_DEFAULTS};
pub use pdf::{parse_pdf_report, PdfExtractor, PdfTextExtractor};
pub use csv_report::parse_csv_report;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Could not parse 'age' from the PDF. Please check the file format.")]
    MissingAge,

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV report contains no data rows")]
    EmptyCsv,

    #[error("Text encoding error: {0}")]
    Encoding(String),
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Csv,
    Pdf,
}

impl ReportKind {
    /// Map a declared MIME type; parameters such as `charset` are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/csv" => Some(Self::Csv),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

/// Decode report bytes of the given kind. Pure: no I/O beyond the bytes.
pub fn parse_report(kind: ReportKind, bytes: &[u8]) -> Result<FeatureRecord, ReportError> {
    match kind {
        ReportKind::Csv => parse_csv_report(bytes),
        ReportKind::Pdf => parse_pdf_report(bytes),
    }
}
