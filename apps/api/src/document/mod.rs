//! Document extraction — turns an uploaded resume PDF into the plain text embedded in the prompt.
//!
//! Pages are read in file order. Pages without a text layer are skipped; the rest are
//! trimmed and joined with a single space.

use std::panic;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF file is empty")]
    EmptyDocument,

    #[error("No text could be extracted from the PDF")]
    NoExtractableText,

    #[error("Malformed PDF document: {0}")]
    MalformedDocument(String),
}

/// Plain text of one resume. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeText(String);

impl ResumeText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResumeText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the text of every page of a PDF held in memory.
pub fn extract(document: &[u8]) -> Result<ResumeText, ExtractError> {
    let pages = read_pages(document)?;
    let page_count = pages.len();
    let text = join_pages(pages)?;

    debug!(
        pages = page_count,
        chars = text.as_str().len(),
        "Extracted resume text"
    );
    Ok(text)
}

fn read_pages(document: &[u8]) -> Result<Vec<String>, ExtractError> {
    // pdf-extract panics on some broken font programs instead of returning an error.
    panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(document))
        .map_err(|_| ExtractError::MalformedDocument("PDF parser aborted".to_string()))?
        .map_err(|e| ExtractError::MalformedDocument(e.to_string()))
}

/// Folds per-page text into a single `ResumeText`.
///
/// Blank pages are skipped. Fails with `EmptyDocument` when there are no pages at all
/// and with `NoExtractableText` when every page is blank.
pub fn join_pages<I>(pages: I) -> Result<ResumeText, ExtractError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let (page_count, text) =
        pages
            .into_iter()
            .fold((0usize, String::new()), |(count, mut text), page| {
                let page = page.as_ref().trim();
                if !page.is_empty() {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(page);
                }
                (count + 1, text)
            });

    match (page_count, text.is_empty()) {
        (0, _) => Err(ExtractError::EmptyDocument),
        (_, true) => Err(ExtractError::NoExtractableText),
        _ => Ok(ResumeText(text)),
    }
}
