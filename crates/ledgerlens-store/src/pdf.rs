//! Document text extraction
//!
//! Readers return page-concatenated text. PDF pages are separated by form
//! feeds (`\x0C`) as emitted by `pdf-extract`, which downstream code uses to
//! recover page boundaries.

use crate::error::StoreError;
use std::path::Path;
use tracing::debug;

/// Capability for turning an uploaded file into text
pub trait DocumentReader: Send + Sync {
    /// Read the full text of the document at `path`
    fn read_text(&self, path: &Path) -> Result<String, StoreError>;
}

/// PDF reader using pdf-extract
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Extract text from PDF bytes already in memory
    pub fn read_bytes(&self, data: &[u8]) -> Result<String, StoreError> {
        pdf_extract::extract_text_from_mem(data).map_err(|e| StoreError::Extraction(e.to_string()))
    }
}

impl DocumentReader for PdfReader {
    fn read_text(&self, path: &Path) -> Result<String, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }

        let text = pdf_extract::extract_text(path)
            .map_err(|e| StoreError::Extraction(format!("{}: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            chars = text.len(),
            pages = page_count(&text),
            "Extracted PDF text"
        );
        Ok(text)
    }
}

/// Reader for documents that are already plain UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextReader;

impl DocumentReader for PlainTextReader {
    fn read_text(&self, path: &Path) -> Result<String, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Number of form-feed separated pages in extracted text
pub fn page_count(text: &str) -> usize {
    text.matches('\x0C').count() + 1
}
