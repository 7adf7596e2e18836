//! Remote-model request/response types for Palaver.
//!
//! These types model the data shapes exchanged with the chat-completions
//! endpoint: the role/content instructions sent per turn, token usage
//! accounting, and the normalized outcome of a single completion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an instruction in the remote-model conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionRole {
    Developer,
    User,
    Assistant,
}

impl fmt::Display for InstructionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionRole::Developer => write!(f, "developer"),
            InstructionRole::User => write!(f, "user"),
            InstructionRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for InstructionRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "developer" => Ok(InstructionRole::Developer),
            "user" => Ok(InstructionRole::User),
            "assistant" => Ok(InstructionRole::Assistant),
            other => Err(format!("invalid instruction role: '{other}'")),
        }
    }
}

/// The wire-level unit sent to the model: one role/content pair per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInstruction {
    pub role: InstructionRole,
    pub content: String,
}

impl RemoteInstruction {
    pub fn developer(content: impl Into<String>) -> Self {
        Self {
            role: InstructionRole::Developer,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: InstructionRole::User,
            content: content.into(),
        }
    }
}

/// Request body for a chat completion.
///
/// Serializes directly to the `{ model, messages }` body the endpoint expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<RemoteInstruction>,
}

/// Token accounting for one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

/// Breakdown of completion tokens, only present when the endpoint reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionTokensDetails {
    pub reasoning_tokens: u32,
    pub accepted_prediction_tokens: u32,
    pub rejected_prediction_tokens: u32,
}

/// A successful completion, already extracted from the endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

impl CompletionResponse {
    /// A response carrying only text, with no usage or model metadata.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
            model: None,
            system_fingerprint: None,
        }
    }
}

/// Normalized outcome of one remote call.
///
/// Either a real message or an error description, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Success(CompletionResponse),
    Failure { error: String },
}

impl CompletionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        CompletionResult::Failure {
            error: error.into(),
        }
    }

    /// The completion text; empty for failures.
    pub fn message(&self) -> &str {
        match self {
            CompletionResult::Success(response) => &response.content,
            CompletionResult::Failure { .. } => "",
        }
    }

    /// The error description, only for failures.
    pub fn error(&self) -> Option<&str> {
        match self {
            CompletionResult::Success(_) => None,
            CompletionResult::Failure { error } => Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CompletionResult::Failure { .. })
    }
}

impl From<LlmError> for CompletionResult {
    fn from(err: LlmError) -> Self {
        CompletionResult::failure(err.describe())
    }
}

/// Errors from the completion path, before normalization.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No credential configured; the request was never sent.
    #[error("missing API credential: set OPENAI_API_KEY or PALAVER_API_KEY")]
    MissingCredential,

    /// The endpoint could not be reached or its response could not be parsed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("endpoint error ({status}): {}", .message.as_deref().unwrap_or("no description"))]
    Endpoint {
        status: u16,
        reason: Option<String>,
        message: Option<String>,
    },
}

impl LlmError {
    /// The user-facing description carried by a failed [`CompletionResult`].
    ///
    /// Endpoint errors prefer the endpoint's own message and otherwise fall
    /// back to `"API Error: <status> - <reason>"`.
    pub fn describe(&self) -> String {
        match self {
            LlmError::MissingCredential => self.to_string(),
            LlmError::Transport(_) => {
                "Unable to reach the completion endpoint or read its response.".to_string()
            }
            LlmError::Endpoint {
                status,
                reason,
                message,
            } => match message.as_deref().filter(|m| !m.is_empty()) {
                Some(message) => message.to_string(),
                None => format!("API Error: {status} - {}", reason.as_deref().unwrap_or("")),
            },
        }
    }
}
