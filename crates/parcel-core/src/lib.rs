//! Parcel Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Parcel component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    Config, DatabaseConfig, FetchConfig, ModelConfig, ParcelConfig, PipelineConfig,
    ServerConfig, StorageConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
