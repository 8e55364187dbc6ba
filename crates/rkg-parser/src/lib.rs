//! RKG Parser - Text acquisition for uploaded documents
//!
//! Supports:
//! - PDF documents (structured extraction with a tolerant fallback)
//! - Plain text and Markdown files
//!
//! The public entry point, [`extract_text_from_upload`], never fails: a
//! document that cannot be read yields an empty string, which the
//! extraction pipeline treats as a valid (empty) document.

use std::path::Path;

use thiserror::Error;
use tracing::warn;

pub mod pdf;

pub use pdf::PdfParser;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during text acquisition
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),

    /// File is corrupted or malformed
    #[error("File is corrupted or malformed: {0}")]
    CorruptedFile(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// File Types
// ============================================================================

/// Supported upload types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Markdown,
    PlainText,
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "md" | "markdown" => Self::Markdown,
            "txt" | "text" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from an upload name hint
    pub fn from_name(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Markdown => write!(f, "markdown"),
            Self::PlainText => write!(f, "text"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Text Acquisition
// ============================================================================

/// Decode bytes as UTF-8, dropping invalid sequences
pub fn read_txt(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .replace(char::REPLACEMENT_CHARACTER, "")
        .trim()
        .to_string()
}

/// Best-effort plain text for an upload.
///
/// `.pdf` names go through [`PdfParser`]; everything else is decoded as
/// text. Total failure is an empty string.
pub fn extract_text_from_upload(name_hint: &str, bytes: &[u8]) -> String {
    match FileType::from_name(name_hint) {
        FileType::Pdf => match PdfParser::new().extract(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = name_hint, error = %e, "PDF extraction failed");
                String::new()
            }
        },
        _ => read_txt(bytes),
    }
}

/// Read a file from disk and extract its text
pub fn extract_text_from_path(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    Ok(extract_text_from_upload(name, &bytes))
}

/// Merge several extracted texts into one document, skipping empty ones
pub fn merge_texts<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
