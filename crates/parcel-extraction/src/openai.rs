//! OpenAI Chat Completions client for JSON-mode extraction

use async_trait::async_trait;
use parcel_core::ModelConfig;
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::error::ExtractionError;
use crate::model::{Completion, CompletionRequest, LanguageModel, TokenUsage};

/// Reply used when the API answers without any message content.
const EMPTY_OBJECT: &str = "{}";

pub struct OpenAiChatModel {
    http_client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenAiChatModel")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiChatModel {
    pub fn new(config: &ModelConfig) -> Result<Self, ExtractionError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ExtractionError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout,
        })
    }

    fn map_request_error(&self, err: reqwest::Error) -> ExtractionError {
        if err.is_timeout() {
            ExtractionError::Timeout(self.timeout)
        } else {
            ExtractionError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete_json(
        &self,
        request: &CompletionRequest,
    ) -> Result<Completion, ExtractionError> {
        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": request.system_instruction
                },
                {
                    "role": "user",
                    "content": request.user_content
                }
            ],
            "temperature": self.temperature,
            "response_format": { "type": "json_object" }
        });

        tracing::debug!(
            model = %self.model,
            input_chars = request.user_content.chars().count(),
            "Sending extraction request to OpenAI API"
        );

        let start = std::time::Instant::now();
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorEnvelope>(&error_text)
                .ok()
                .and_then(|envelope| envelope.error)
                .map(|error| match error.error_type {
                    Some(error_type) => format!("{} ({})", error.message, error_type),
                    None => error.message,
                })
                .unwrap_or(error_text);

            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let chat_response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            ExtractionError::MalformedOutput(format!("unreadable completion response: {}", e))
        })?;

        let (content, finish_reason) = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| (choice.message.content, choice.finish_reason))
            .unwrap_or((None, None));

        let content = content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| EMPTY_OBJECT.to_string());

        let usage = chat_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        tracing::info!(
            model = %self.model,
            finish_reason = finish_reason.as_deref().unwrap_or("unknown"),
            total_tokens = usage.as_ref().and_then(|u| u.total_tokens),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "OpenAI extraction completed"
        );

        Ok(Completion {
            content,
            finish_reason,
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}
