//! Parcel Extraction Library
//!
//! Turns the free text of a listing document into a [`PropertyData`] by asking a language
//! model for JSON shaped like a fixed schema, then normalizing whatever comes back.
//!
//! [`PropertyData`]: parcel_core::models::PropertyData

pub mod error;
pub mod extractor;
pub mod model;
pub mod normalize;
pub mod openai;
pub mod prompt;
pub mod schema;

pub use error::ExtractionError;
pub use extractor::SchemaExtractor;
pub use model::{Completion, CompletionRequest, LanguageModel, TokenUsage};
pub use normalize::{parse_property_data, strip_code_fences};
pub use openai::OpenAiChatModel;
pub use prompt::PromptBuilder;
pub use schema::{FieldKind, PropertySchema, SchemaField};
