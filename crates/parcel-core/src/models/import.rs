use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// A stage of the property import pipeline.
///
/// Failures are reported against the stage that raised them so the caller sees which
/// effect did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Fetch,
    TextExtract,
    SchemaExtract,
    Archive,
    Persist,
}

impl ImportStage {
    /// User-facing description of the effect that failed at this stage.
    pub fn failure_label(&self) -> &'static str {
        match self {
            ImportStage::Fetch => "Failed to fetch PDF",
            ImportStage::TextExtract => "PDF text extraction failed",
            ImportStage::SchemaExtract => "Property extraction failed",
            ImportStage::Archive => "Storage upload error",
            ImportStage::Persist => "Database insert error",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Fetch => "fetch",
            ImportStage::TextExtract => "text_extract",
            ImportStage::SchemaExtract => "schema_extract",
            ImportStage::Archive => "archive",
            ImportStage::Persist => "persist",
        }
    }
}

impl Display for ImportStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
