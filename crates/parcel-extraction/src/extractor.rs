use parcel_core::models::{ExtractedText, PropertyData};
use parcel_core::ModelConfig;
use std::sync::Arc;

use crate::error::ExtractionError;
use crate::model::{CompletionRequest, LanguageModel};
use crate::normalize::parse_property_data;
use crate::prompt::PromptBuilder;
use crate::schema::PropertySchema;

/// Extracts [`PropertyData`] from document text with a language model.
pub struct SchemaExtractor {
    model: Arc<dyn LanguageModel>,
    schema: PropertySchema,
    max_input_chars: usize,
    retry_on_malformed: bool,
}

impl SchemaExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, config: &ModelConfig) -> Self {
        Self {
            model,
            schema: PropertySchema::standard(),
            max_input_chars: config.max_input_chars,
            retry_on_malformed: config.retry_on_malformed,
        }
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub async fn extract(&self, text: &ExtractedText) -> Result<PropertyData, ExtractionError> {
        let full_text = text.as_text();
        let input = truncate_chars(&full_text, self.max_input_chars);
        if input.len() < full_text.len() {
            tracing::warn!(
                original_chars = full_text.chars().count(),
                max_input_chars = self.max_input_chars,
                "Document text exceeds model input limit, truncating"
            );
        }
        if input.is_empty() {
            tracing::debug!("Document has no text, extraction will yield an empty record");
        }

        let prompt = PromptBuilder::new(&self.schema);
        let request = CompletionRequest {
            system_instruction: prompt.system_instruction(),
            user_content: input.to_string(),
        };

        let first = self
            .model
            .complete_json(&request)
            .await
            .and_then(|completion| parse_property_data(&completion.content));
        match first {
            Err(e) if e.is_malformed_output() && self.retry_on_malformed => {
                tracing::warn!(
                    model = self.model.model_name(),
                    error = %e,
                    "Model output malformed, retrying with stricter instruction"
                );

                let retry = CompletionRequest {
                    system_instruction: prompt.strict_instruction(),
                    ..request
                };
                let completion = self.model.complete_json(&retry).await?;
                parse_property_data(&completion.content)
            }
            result => result,
        }
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
