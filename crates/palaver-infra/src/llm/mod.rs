//! Completion provider implementations.
//!
//! Contains the concrete [`CompletionProvider`] for OpenAI-compatible
//! endpoints and a factory that builds it from a [`ChatConfig`].

pub mod openai_compat;

use secrecy::SecretString;
use tracing::{info, warn};

use palaver_core::llm::provider::CompletionProvider;
use palaver_types::config::ChatConfig;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Build the provider for the configured endpoint.
///
/// A missing credential is not an error here: the provider is still built
/// and every completion fails with a configuration error instead, so the
/// session can start and show history.
pub fn create_provider(config: &ChatConfig, api_key: Option<SecretString>) -> OpenAiCompatibleProvider {
    let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig::from_chat_config(config, api_key));
    if !provider.has_credential() {
        warn!("No API credential configured; completions will fail until one is set");
    }
    info!(
        provider = provider.name(),
        base_url = provider.base_url(),
        model = %config.model,
        "Completion provider ready"
    );
    provider
}
