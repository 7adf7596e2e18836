//! Client configuration types for Palaver.
//!
//! `ChatConfig` represents the top-level `config.toml` that controls the
//! developer instruction, the remote model, and the endpoint. The credential
//! is deliberately absent: it is resolved separately and never serialized.

use serde::{Deserialize, Serialize};

/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Default OpenAI-compatible endpoint base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Top-level configuration for the Palaver client.
///
/// Loaded from `~/.palaver/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Overrides the default developer instruction. `{name}` is replaced with
    /// the remembered user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_template: Option<String>,

    /// Remote model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the chat-completions API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of history entries sent with each request.
    /// `None` sends the whole history. Persisted history is never trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt_template: None,
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_history: None,
        }
    }
}
