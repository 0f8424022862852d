//! Property import service
//!
//! Drives one submitted document through fetch, text extraction, schema extraction,
//! archival and persistence. Any stage failure ends the import in `Failed(stage, cause)`;
//! nothing is retried or rolled back here.

mod pipeline;
mod state;

pub use pipeline::ImportPipeline;
pub use state::{ImportState, InvalidTransition};

use parcel_core::models::ImportStage;
use parcel_core::AppError;
use parcel_db::PersistError;
use parcel_extraction::ExtractionError;
use parcel_processing::{FetchError, ParseError};
use parcel_storage::ArchiveError;
use percent_encoding::percent_decode_str;
use std::time::Duration;
use thiserror::Error;

/// Name used when neither the caller nor the URL provides one.
pub const DEFAULT_DOCUMENT_NAME: &str = "document.pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub document_url: String,
    pub document_name: String,
}

impl ImportRequest {
    /// Build a request, deriving the document name from the URL when none is given.
    pub fn new(document_url: impl Into<String>, document_name: Option<String>) -> Self {
        let document_url = document_url.into();
        let document_name = document_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| name_from_url(&document_url))
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());

        Self {
            document_url,
            document_name,
        }
    }
}

fn name_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url.trim()).ok()?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())?;

    let name = percent_decode_str(segment).decode_utf8_lossy().trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// What went wrong inside a stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Stage timed out after {0:?}")]
    Timeout(Duration),
}

/// Terminal failure of an import: the stage that failed and why.
#[derive(Debug, Error)]
#[error("{}: {cause}", .stage.failure_label())]
pub struct ImportFailure {
    pub stage: ImportStage,
    #[source]
    pub cause: StageError,
}

impl ImportFailure {
    pub fn new(stage: ImportStage, cause: StageError) -> Self {
        Self { stage, cause }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, StageError::Timeout(_))
    }

    pub fn to_state(&self) -> ImportState {
        ImportState::Failed {
            stage: self.stage,
            cause: self.cause.to_string(),
        }
    }
}

impl From<ImportFailure> for AppError {
    fn from(failure: ImportFailure) -> Self {
        AppError::ImportFailed {
            stage: failure.stage,
            timed_out: failure.is_timeout(),
            message: failure.cause.to_string(),
        }
    }
}
