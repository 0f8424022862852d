//! Document text extraction

pub mod pdf;

use async_trait::async_trait;
use bytes::Bytes;
use parcel_core::models::ExtractedText;
use thiserror::Error;

pub use pdf::PdfTextExtractor;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Document is not a PDF (missing %PDF header)")]
    NotPdf,

    #[error("Malformed PDF: {0}")]
    Malformed(String),

    #[error("PDF contains no pages")]
    NoPages,
}

/// Turns raw document bytes into page-ordered text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Bytes) -> Result<ExtractedText, ParseError>;
}
