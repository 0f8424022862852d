//! PDF text extraction using the pdf-extract crate.
//!
//! Handles digital PDFs with embedded text layers. Images are ignored by the parser,
//! so scanned pages simply contribute no text.

use async_trait::async_trait;
use bytes::Bytes;
use parcel_core::models::ExtractedText;

use super::{ParseError, TextExtractor};

const PDF_MAGIC: &[u8] = b"%PDF";

pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Parse synchronously. CPU-bound; callers on the runtime should use [`TextExtractor::extract`].
    pub fn extract_pages(data: &[u8]) -> Result<Vec<String>, ParseError> {
        if !data.starts_with(PDF_MAGIC) {
            return Err(ParseError::NotPdf);
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| ParseError::Malformed(e.to_string()))?;

        if pages.is_empty() {
            return Err(ParseError::NoPages);
        }

        Ok(pages)
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, data: Bytes) -> Result<ExtractedText, ParseError> {
        let start = std::time::Instant::now();
        let size = data.len();

        // pdf-extract panics on some malformed inputs; the blocking task contains it.
        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&data))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    ParseError::Malformed("PDF parser aborted on malformed content".to_string())
                } else {
                    ParseError::Malformed(format!("PDF parsing task failed: {}", e))
                }
            })??;

        let text = ExtractedText::from_pages(pages);

        tracing::debug!(
            size_bytes = size,
            page_count = text.page_count(),
            empty = text.is_empty(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Extracted PDF text"
        );

        Ok(text)
    }
}
