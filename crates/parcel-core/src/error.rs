//! Error types module
//!
//! This module provides the application-level error type used by the Parcel API.
//! Stage-specific errors (fetch, parse, extraction, archive, persist) live next to the
//! component that raises them and are folded into [`AppError::ImportFailed`] by the
//! pipeline orchestrator.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::models::ImportStage;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and upstream failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// A property import terminated in its `Failed(stage, cause)` state.
    #[error("{}: {message}", .stage.failure_label())]
    ImportFailed {
        stage: ImportStage,
        message: String,
        timed_out: bool,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::ImportFailed {
            timed_out: true, ..
        } => (
            504,
            "IMPORT_TIMEOUT",
            true,
            Some("Resubmit the document later"),
            false,
            LogLevel::Warn,
        ),
        AppError::ImportFailed { stage, .. } => match stage {
            ImportStage::Fetch => (
                502,
                "FETCH_FAILED",
                true,
                Some("Check that the document URL is reachable and resubmit"),
                false,
                LogLevel::Warn,
            ),
            ImportStage::TextExtract => (
                422,
                "PARSE_FAILED",
                false,
                Some("Submit a valid, text-based PDF document"),
                false,
                LogLevel::Warn,
            ),
            ImportStage::SchemaExtract => (
                502,
                "EXTRACTION_FAILED",
                true,
                Some("Resubmit the document after a short delay"),
                false,
                LogLevel::Warn,
            ),
            ImportStage::Archive => (
                500,
                "ARCHIVE_FAILED",
                true,
                Some("Resubmit the document after a short delay"),
                false,
                LogLevel::Error,
            ),
            ImportStage::Persist => (
                500,
                "PERSIST_FAILED",
                true,
                Some("Resubmit the document after a short delay"),
                false,
                LogLevel::Error,
            ),
        },
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::ImportFailed { .. } => "ImportFailed",
        }
    }

    /// Pipeline stage for import failures
    pub fn import_stage(&self) -> Option<ImportStage> {
        match self {
            AppError::ImportFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
            AppError::ImportFailed { .. } => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Property not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Property not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_import_failure_names_stage_effect_and_cause() {
        let err = AppError::ImportFailed {
            stage: ImportStage::Persist,
            message: "duplicate key value violates unique constraint".to_string(),
            timed_out: false,
        };
        assert_eq!(
            err.client_message(),
            "Database insert error: duplicate key value violates unique constraint"
        );
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "PERSIST_FAILED");
        assert!(!err.is_sensitive());
        assert_eq!(err.import_stage(), Some(ImportStage::Persist));
    }

    #[test]
    fn test_import_failure_status_by_stage() {
        let failed = |stage, timed_out| AppError::ImportFailed {
            stage,
            message: "cause".to_string(),
            timed_out,
        };
        assert_eq!(failed(ImportStage::Fetch, false).http_status_code(), 502);
        assert_eq!(failed(ImportStage::TextExtract, false).http_status_code(), 422);
        assert_eq!(failed(ImportStage::SchemaExtract, false).http_status_code(), 502);
        assert_eq!(failed(ImportStage::Archive, false).http_status_code(), 500);
        assert_eq!(failed(ImportStage::Fetch, true).http_status_code(), 504);
        assert!(!failed(ImportStage::TextExtract, false).is_recoverable());
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::InvalidInput("test".to_string());
        assert_eq!(
            err.suggested_action(),
            Some("Check request parameters and try again")
        );

        let err = AppError::NotFound("test".to_string());
        assert_eq!(err.suggested_action(), Some("Verify the resource ID exists"));
    }
}
