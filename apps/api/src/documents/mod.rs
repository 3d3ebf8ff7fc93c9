// Document Text Extractor
// Turns an uploaded PDF or Word document into normalized plain text.
// PDF parsing is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod docx;
pub mod extract;
pub mod normalize;

use bytes::Bytes;
use thiserror::Error;

pub use extract::extract_text;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MSWORD_MIME: &str = "application/msword";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text from document: {0}")]
    ExtractionFailed(String),
}

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves a declared MIME type. Parameters such as `; charset=` are ignored.
    pub fn from_mime(mime: &str) -> Result<Self, ExtractError> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Ok(DocumentKind::Pdf),
            DOCX_MIME | MSWORD_MIME => Ok(DocumentKind::Docx),
            _ => Err(ExtractError::UnsupportedFormat(mime.to_string())),
        }
    }
}

/// An uploaded document. Consumed immediately, never persisted.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub mime: String,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_mime_resolves() {
        assert_eq!(DocumentKind::from_mime("application/pdf").unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_word_mimes_resolve_to_docx() {
        assert_eq!(DocumentKind::from_mime(DOCX_MIME).unwrap(), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_mime(MSWORD_MIME).unwrap(), DocumentKind::Docx);
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        assert_eq!(
            DocumentKind::from_mime("Application/PDF; charset=binary").unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn test_other_mime_is_unsupported() {
        match DocumentKind::from_mime("image/png") {
            Err(ExtractError::UnsupportedFormat(m)) => assert_eq!(m, "image/png"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
