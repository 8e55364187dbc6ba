//! PDF text extraction
//!
//! Tries pdf-extract first (layout-aware, fast path). When that fails or
//! returns nothing, falls back to walking the page tree with lopdf and
//! extracting each page on its own, so one unreadable page does not lose
//! the whole document.

use std::panic::{self, UnwindSafe};

use tracing::{debug, warn};

use crate::{ParserError, Result};

/// PDF text extractor
#[derive(Debug, Clone)]
pub struct PdfParser {
    /// Whether to try the per-page fallback
    pub fallback: bool,
}

impl PdfParser {
    /// Create a new PDF parser with default settings
    pub fn new() -> Self {
        Self { fallback: true }
    }

    /// Enable or disable the per-page fallback
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }

    /// Extract trimmed text from PDF bytes
    pub fn extract(&self, bytes: &[u8]) -> Result<String> {
        match self.extract_structured(bytes) {
            Ok(text) if !text.is_empty() => return Ok(text),
            Ok(_) => debug!("Structured PDF extraction returned no text"),
            Err(e) => debug!(error = %e, "Structured PDF extraction failed"),
        }

        if !self.fallback {
            return Ok(String::new());
        }
        self.extract_per_page(bytes)
    }

    fn extract_structured(&self, bytes: &[u8]) -> Result<String> {
        let text = catch_panic("pdf-extract", || pdf_extract::extract_text_from_mem(bytes))?
            .map_err(|e| ParserError::PdfError(e.to_string()))?;
        Ok(text.trim().to_string())
    }

    fn extract_per_page(&self, bytes: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| ParserError::CorruptedFile(e.to_string()))?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => warn!(page = page_number, error = %e, "Skipping unreadable PDF page"),
            }
        }

        Ok(pages.join("\n").trim().to_string())
    }
}

/// Run a third-party extractor, turning a panic on malformed input into an error
fn catch_panic<T>(extractor: &str, f: impl FnOnce() -> T + UnwindSafe) -> Result<T> {
    panic::catch_unwind(f).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(extractor, panic = %message, "PDF extractor panicked");
        ParserError::PdfError(format!("{extractor} panicked: {message}"))
    })
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}
