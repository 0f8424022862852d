//! Lifecycle of a single import.

use parcel_core::models::ImportStage;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportState {
    Submitted,
    Fetched,
    TextExtracted,
    SchemaExtracted,
    Archived,
    Persisted,
    Succeeded,
    Failed { stage: ImportStage, cause: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid import transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl ImportState {
    pub fn name(&self) -> &'static str {
        match self {
            ImportState::Submitted => "submitted",
            ImportState::Fetched => "fetched",
            ImportState::TextExtracted => "text_extracted",
            ImportState::SchemaExtracted => "schema_extracted",
            ImportState::Archived => "archived",
            ImportState::Persisted => "persisted",
            ImportState::Succeeded => "succeeded",
            ImportState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportState::Succeeded | ImportState::Failed { .. })
    }

    /// Move to `next` if the lifecycle allows it.
    ///
    /// Stages advance strictly in order. `Failed` is reachable from every non-terminal state;
    /// nothing leaves a terminal state.
    pub fn advance(&self, next: ImportState) -> Result<ImportState, InvalidTransition> {
        use ImportState::*;

        let allowed = match (self, &next) {
            (current, _) if current.is_terminal() => false,
            (_, Failed { .. }) => true,
            (Submitted, Fetched)
            | (Fetched, TextExtracted)
            | (TextExtracted, SchemaExtracted)
            | (SchemaExtracted, Archived)
            | (Archived, Persisted)
            | (Persisted, Succeeded) => true,
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self.name(),
                to: next.name(),
            })
        }
    }
}

impl Display for ImportState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImportState::Failed { stage, cause } => write!(f, "failed({}): {}", stage, cause),
            other => f.write_str(other.name()),
        }
    }
}
