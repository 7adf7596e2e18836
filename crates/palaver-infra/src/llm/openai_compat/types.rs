//! Chat-completions wire types.
//!
//! These mirror the snake_case JSON of the OpenAI chat-completions endpoint.
//! They are NOT the provider-agnostic types from palaver-types; conversion
//! happens in [`super::OpenAiCompatibleProvider`].

use serde::Deserialize;

use palaver_types::llm::{CompletionResponse, CompletionTokensDetails, TokenUsage};

/// Successful response body. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    /// Null when the model produced no text (e.g. a refusal).
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub completion_tokens_details: Option<WireCompletionTokensDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCompletionTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: u32,
    #[serde(default)]
    pub accepted_prediction_tokens: u32,
    #[serde(default)]
    pub rejected_prediction_tokens: u32,
}

/// Error body: `{ "error": { "message": ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

impl From<WireUsage> for TokenUsage {
    fn from(usage: WireUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
            completion_tokens_details: usage.completion_tokens_details.map(|d| {
                CompletionTokensDetails {
                    reasoning_tokens: d.reasoning_tokens,
                    accepted_prediction_tokens: d.accepted_prediction_tokens,
                    rejected_prediction_tokens: d.rejected_prediction_tokens,
                }
            }),
        }
    }
}

impl ChatCompletionResponse {
    /// Convert into a [`CompletionResponse`] using the first choice.
    ///
    /// Returns `None` when the response carries no choices.
    pub fn into_completion(self) -> Option<CompletionResponse> {
        let first = self.choices.into_iter().next()?;
        Some(CompletionResponse {
            content: first.message.content.unwrap_or_default(),
            usage: self.usage.map(TokenUsage::from),
            model: self.model,
            system_fingerprint: self.system_fingerprint,
        })
    }
}

/// The endpoint's own description from an error body, if it has one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.trim().is_empty())
}
