use std::panic::{catch_unwind, AssertUnwindSafe};

use super::fields::parse_report_text;
use super::types::FeatureRecord;
use super::ReportError;

/// PDF text layer abstraction (allows mocking for tests)
pub trait PdfExtractor: Send + Sync {
    /// Text of every page, concatenated in page order.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ReportError>;
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ReportError> {
        // pdf-extract panics on some malformed inputs instead of erroring
        let extracted = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(pdf_bytes)
        }))
        .map_err(|_| ReportError::PdfParsing("malformed PDF structure".into()))?;

        extracted.map_err(|e| ReportError::PdfParsing(e.to_string()))
    }
}

/// Parse a PDF report with the default extractor.
pub fn parse_pdf_report(pdf_bytes: &[u8]) -> Result<FeatureRecord, ReportError> {
    parse_pdf_report_with(&PdfTextExtractor, pdf_bytes)
}

pub fn parse_pdf_report_with(
    extractor: &dyn PdfExtractor,
    pdf_bytes: &[u8],
) -> Result<FeatureRecord, ReportError> {
    let text = extractor.extract_text(pdf_bytes)?;
    tracing::debug!(chars = text.len(), "PDF text extracted");
    parse_report_text(&text)
}
