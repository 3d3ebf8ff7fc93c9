use tracing::{debug, warn};

use super::docx::docx_text;
use super::normalize::normalize_text;
use super::{DocumentKind, ExtractError, RawDocument};

/// Extracts and normalizes the text of an uploaded document.
///
/// The MIME type is checked before any parsing, so unsupported uploads are
/// rejected without touching the bytes. Parsing runs on the blocking pool;
/// a panic inside the PDF library surfaces as `ExtractionFailed`.
pub async fn extract_text(doc: &RawDocument) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_mime(&doc.mime)?;
    let bytes = doc.bytes.clone();

    let raw = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&bytes),
        DocumentKind::Docx => docx_text(&bytes),
    })
    .await
    .map_err(|e| {
        warn!("Document parser aborted: {e}");
        ExtractError::ExtractionFailed("the document parser crashed on this file".to_string())
    })??;

    let text = normalize_text(&raw);
    debug!("Extracted {} characters from {:?} upload", text.len(), kind);
    Ok(text)
}

/// Page text in document order; pdf-extract separates pages with newlines.
fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::ExtractionFailed(format!("PDF could not be read: {e}")))
}
