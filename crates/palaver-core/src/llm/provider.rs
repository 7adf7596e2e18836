//! CompletionProvider trait definition.
//!
//! This is the abstraction every chat-completions backend implements.
//! Providers report failures as [`LlmError`]; turning those into
//! user-visible results is the job of [`super::client::CompletionClient`].

use std::sync::Arc;

use palaver_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for chat-completion backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in palaver-infra (e.g., `OpenAiCompatibleProvider`).
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Perform one round trip: no retry, no streaming.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}

impl<P: CompletionProvider> CompletionProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send {
        (**self).complete(request)
    }
}
