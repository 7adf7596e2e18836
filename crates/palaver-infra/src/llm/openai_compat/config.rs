//! Connection settings for an OpenAI-compatible endpoint.

use std::time::Duration;

use palaver_types::config::{ChatConfig, DEFAULT_BASE_URL};
use secrecy::SecretString;

/// Configuration for an [`super::OpenAiCompatibleProvider`].
///
/// Holds the credential as a [`SecretString`]; the `Debug` impl redacts it.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name used in logs.
    pub provider_name: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    /// `None` makes every request fail with a configuration error before
    /// anything is sent.
    pub api_key: Option<SecretString>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Settings for the configured endpoint.
    pub fn from_chat_config(config: &ChatConfig, api_key: Option<SecretString>) -> Self {
        Self {
            provider_name: "openai".into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
        }
    }
}

impl std::fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("provider_name", &self.provider_name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// OpenAI defaults: `https://api.openai.com/v1`, 120 second timeout.
pub fn openai_defaults(api_key: Option<SecretString>) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: DEFAULT_BASE_URL.into(),
        api_key,
        timeout: Duration::from_secs(120),
    }
}
