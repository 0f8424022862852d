use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Separator placed between consecutive page texts.
pub const PAGE_SEPARATOR: &str = "\n";

/// A document handed to one pipeline invocation.
///
/// Owned by that invocation only; the bytes are dropped once it terminates.
#[derive(Debug, Clone)]
pub struct SubmittedDocument {
    pub bytes: Bytes,
    pub name: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmittedDocument {
    pub fn new(bytes: Bytes, name: impl Into<String>) -> Self {
        Self {
            bytes,
            name: name.into(),
            submitted_at: Utc::now(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Page-level text pulled out of a document, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pages: Vec<String>,
}

impl ExtractedText {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Concatenate the non-blank pages, in order, with [`PAGE_SEPARATOR`].
    ///
    /// A document without any text yields an empty string.
    pub fn as_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.trim())
            .filter(|page| !page.is_empty())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.trim().is_empty())
    }
}

/// Where an archived source document lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArchivedDocumentRef {
    pub storage_path: String,
    pub public_url: String,
}
