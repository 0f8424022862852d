use async_trait::async_trait;

use crate::error::ExtractionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Raw reply text. Expected to be a JSON object but not yet checked.
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// A chat model that can be asked for a JSON object reply.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete_json(&self, request: &CompletionRequest)
        -> Result<Completion, ExtractionError>;

    fn model_name(&self) -> &str;
}
