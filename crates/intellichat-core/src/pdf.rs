//! PDF text extraction backed by the `pdf-extract` crate.
//!
//! The extractor returns all pages as a single string with form feeds
//! between pages; the page split here relies on that, with a triple-newline
//! fallback for documents where no form feeds survive. The "summary" is
//! literal truncation to the first pages, not computation.

use crate::errors::ChatError;

/// Pages concatenated into the upload summary.
pub const SUMMARY_PAGE_COUNT: usize = 3;

/// Text of all pages. An unreadable or textless document is an error.
pub fn extract_text(bytes: &[u8]) -> Result<String, ChatError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ChatError::Pdf(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ChatError::Pdf(
            "document contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}

/// Splits extracted text into per-page slices.
pub fn page_texts(text: &str) -> Vec<&str> {
    if text.contains('\x0C') {
        text.split('\x0C').collect()
    } else {
        text.split("\n\n\n").collect()
    }
}

/// Concatenated text of the first `max_pages` pages. A document that fails
/// to open is reported as `None`, with no retry.
pub fn summarize(bytes: &[u8], max_pages: usize) -> Option<String> {
    let text = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("failed to open PDF for summary: {}", e);
            return None;
        }
    };

    let summary = page_texts(&text)
        .iter()
        .take(max_pages)
        .map(|page| page.trim())
        .collect::<Vec<_>>()
        .join("\n\n");

    Some(summary)
}
