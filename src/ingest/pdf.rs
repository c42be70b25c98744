//! PDF text extraction using lopdf

use lopdf::Document;

use crate::error::{HrqaError, Result};

/// Extract the text of every page, in page order, joined by newlines.
///
/// Pages without text are skipped; a document with no text at all (for
/// example a scanned image) is an error.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String> {
    if pdf_bytes.is_empty() {
        return Err(HrqaError::InvalidPdf("empty file".to_string()));
    }

    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| HrqaError::InvalidPdf(format!("Failed to load PDF: {}", e)))?;

    let pages = doc.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());

    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) if !text.trim().is_empty() => page_texts.push(text),
            Ok(_) => {}
            Err(e) => tracing::debug!("Skipping page {}: {}", page_num, e),
        }
    }

    if page_texts.is_empty() {
        return Err(HrqaError::NoExtractableText);
    }

    tracing::debug!(
        "Extracted text from {}/{} pages",
        page_texts.len(),
        pages.len()
    );

    Ok(page_texts.join("\n"))
}
