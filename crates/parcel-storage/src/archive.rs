//! Durable archiving of source documents.
//!
//! Every submission is written under its own key built from the submission timestamp
//! (nanosecond precision) and the sanitized document name:
//!
//! `{prefix}/{YYYYMMDD_HHMMSS_nnnnnnnnn}_{name}`
//!
//! Writes are create-only, so an archived blob is never replaced.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parcel_core::models::{ArchivedDocumentRef, SubmittedDocument};
use thiserror::Error;

use crate::{Storage, StorageError};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const MAX_NAME_LENGTH: usize = 200;
const FALLBACK_NAME: &str = "document.pdf";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Reduce a client-supplied name to a single safe path segment.
pub fn sanitize_document_name(name: &str) -> String {
    let last_segment = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(name)
        .trim();

    let mut sanitized: String = last_segment
        .chars()
        .take(MAX_NAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.trim_matches('_').is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        sanitized.to_string()
    }
}

/// Storage key for a document submitted at `submitted_at`.
pub fn archive_key(prefix: &str, name: &str, submitted_at: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        prefix.trim_matches('/'),
        submitted_at.format("%Y%m%d_%H%M%S_%9f"),
        sanitize_document_name(name)
    )
}

/// Writes submitted documents to durable storage.
#[derive(Clone)]
pub struct DocumentArchiver {
    storage: Arc<dyn Storage>,
    prefix: String,
}

impl DocumentArchiver {
    pub fn new(storage: Arc<dyn Storage>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    pub async fn archive(
        &self,
        document: &SubmittedDocument,
    ) -> Result<ArchivedDocumentRef, ArchiveError> {
        let storage_path = archive_key(&self.prefix, &document.name, document.submitted_at);

        let public_url = self
            .storage
            .create_with_key(&storage_path, document.bytes.clone(), PDF_CONTENT_TYPE)
            .await?;

        tracing::debug!(
            key = %storage_path,
            backend = %self.storage.backend_type(),
            "Archived source document"
        );

        Ok(ArchivedDocumentRef {
            storage_path,
            public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalStorage;
    use bytes::Bytes;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn document(name: &str, submitted_at: DateTime<Utc>) -> SubmittedDocument {
        SubmittedDocument {
            bytes: Bytes::from_static(b"%PDF-1.4 listing"),
            name: name.to_string(),
            submitted_at,
        }
    }

    #[test]
    fn test_archive_key_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap() + Duration::nanoseconds(42);
        assert_eq!(
            archive_key("documents", "listing.pdf", at),
            "documents/20240301_101500_000000042_listing.pdf"
        );
    }

    #[test]
    fn test_same_name_distinct_timestamps_never_collide() {
        let first = Utc::now();
        let second = first + Duration::microseconds(1);
        assert_ne!(
            archive_key("documents", "listing.pdf", first),
            archive_key("documents", "listing.pdf", second)
        );
    }

    #[test]
    fn test_sanitize_document_name() {
        assert_eq!(sanitize_document_name("listing.pdf"), "listing.pdf");
        assert_eq!(sanitize_document_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_document_name("C:\\docs\\My Listing.pdf"), "My_Listing.pdf");
        assert_eq!(sanitize_document_name("a..b.pdf"), "a.b.pdf");
        assert_eq!(sanitize_document_name(".."), FALLBACK_NAME);
        assert_eq!(sanitize_document_name("   "), FALLBACK_NAME);
        assert_eq!(sanitize_document_name("???"), FALLBACK_NAME);
    }

    #[tokio::test]
    async fn test_archive_writes_under_distinct_paths() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap();
        let archiver = DocumentArchiver::new(Arc::new(storage.clone()), "documents");

        let first_at = Utc::now();
        let first = archiver
            .archive(&document("listing.pdf", first_at))
            .await
            .unwrap();
        let second = archiver
            .archive(&document("listing.pdf", first_at + Duration::microseconds(1)))
            .await
            .unwrap();

        assert_ne!(first.storage_path, second.storage_path);
        assert!(first.storage_path.starts_with("documents/"));
        assert!(first.storage_path.ends_with("_listing.pdf"));
        assert_eq!(
            first.public_url,
            format!("http://localhost:3000/files/{}", first.storage_path)
        );
        assert!(dir.path().join(&first.storage_path).exists());
        assert!(dir.path().join(&second.storage_path).exists());
    }

    #[tokio::test]
    async fn test_archive_refuses_existing_path() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap();
        let archiver = DocumentArchiver::new(Arc::new(storage), "documents");

        let at = Utc::now();
        archiver.archive(&document("listing.pdf", at)).await.unwrap();
        let result = archiver.archive(&document("listing.pdf", at)).await;

        assert!(matches!(
            result,
            Err(ArchiveError::Storage(StorageError::AlreadyExists(_)))
        ));
    }
}
