//! PDF text extraction against generated documents

mod support;

use hrqa::error::HrqaError;
use hrqa::ingest::pdf::extract_text;
use support::build_pdf;

#[test]
fn test_extracts_pages_in_order() {
    let bytes = build_pdf(&[Some("Holiday policy"), None, Some("Sickness reporting")]);
    let text = extract_text(&bytes).unwrap();

    let holiday = text.find("Holiday policy").unwrap();
    let sickness = text.find("Sickness reporting").unwrap();
    assert!(holiday < sickness);
}

#[test]
fn test_no_text_is_reported() {
    let bytes = build_pdf(&[None, None]);
    assert!(matches!(
        extract_text(&bytes),
        Err(HrqaError::NoExtractableText)
    ));
}

#[test]
fn test_garbage_is_invalid_pdf() {
    assert!(matches!(
        extract_text(b"definitely not a pdf"),
        Err(HrqaError::InvalidPdf(_))
    ));
    assert!(matches!(extract_text(&[]), Err(HrqaError::InvalidPdf(_))));
}
