//! Data models for the application
//!
//! Documents flowing through the import pipeline, the property record it produces,
//! and the stage identifiers used to report failures.

mod document;
mod import;
mod property;

pub use document::*;
pub use import::*;
pub use property::*;
