//! Parcel Storage Library
//!
//! Storage abstraction with S3 and local filesystem backends, plus the archiver that
//! writes submitted source documents to durable storage.
//!
//! # Storage key format
//!
//! Archived documents live at `{prefix}/{timestamp}_{name}` (see [`archive`]).
//! Keys must not contain `..` or a leading `/`.

pub mod archive;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use archive::{archive_key, sanitize_document_name, ArchiveError, DocumentArchiver};
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use parcel_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
