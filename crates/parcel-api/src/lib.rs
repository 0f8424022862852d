//! Parcel API Library
//!
//! HTTP surface, import orchestration and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::import::{ImportFailure, ImportPipeline, ImportRequest, ImportState};
pub use state::AppState;
