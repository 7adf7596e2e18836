//! Completion client: the normalization boundary for the completion path.
//!
//! Wraps a [`CompletionProvider`] and guarantees that callers only ever see
//! a well-formed [`CompletionResult`]. Configuration, transport and
//! endpoint-reported failures all become `CompletionResult::Failure`.

use std::time::Instant;

use palaver_types::llm::{CompletionRequest, CompletionResult, RemoteInstruction};
use tracing::{debug, info, warn};

use super::provider::CompletionProvider;

/// Sends instruction sequences to a provider and normalizes the outcome.
pub struct CompletionClient<P: CompletionProvider> {
    provider: P,
}

impl<P: CompletionProvider> CompletionClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Access the wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one completion and normalize the result.
    pub async fn complete(
        &self,
        instructions: Vec<RemoteInstruction>,
        model: &str,
    ) -> CompletionResult {
        let request = CompletionRequest {
            model: model.to_string(),
            messages: instructions,
        };
        debug!(
            provider = self.provider.name(),
            model,
            instructions = request.messages.len(),
            "Sending completion request"
        );

        let started = Instant::now();
        match self.provider.complete(&request).await {
            Ok(response) => {
                info!(
                    provider = self.provider.name(),
                    model = response.model.as_deref().unwrap_or(model),
                    total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Completion succeeded"
                );
                CompletionResult::Success(response)
            }
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Completion failed"
                );
                e.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_types::llm::{CompletionResponse, LlmError};
    use std::sync::Mutex;

    /// Provider that replays a scripted outcome and records the request.
    struct ScriptedProvider {
        outcome: Mutex<Option<Result<CompletionResponse, LlmError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(outcome: Result<CompletionResponse, LlmError>) -> Self {
            Self {
                outcome: Mutex::new(Some(outcome)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".into())))
        }
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let client = CompletionClient::new(ScriptedProvider::new(Ok(CompletionResponse::text(
            "hello",
        ))));
        let result = client
            .complete(vec![RemoteInstruction::user("hi")], "gpt-4-turbo")
            .await;
        assert_eq!(result.message(), "hello");

        let seen = client.provider().seen.lock().unwrap();
        assert_eq!(seen[0].model, "gpt-4-turbo");
        assert_eq!(seen[0].messages, vec![RemoteInstruction::user("hi")]);
    }

    #[tokio::test]
    async fn test_endpoint_error_is_normalized() {
        let client = CompletionClient::new(ScriptedProvider::new(Err(LlmError::Endpoint {
            status: 401,
            reason: Some("Unauthorized".into()),
            message: Some("invalid key".into()),
        })));
        let result = client.complete(vec![], "m").await;
        assert_eq!(result, CompletionResult::failure("invalid key"));
        assert_eq!(result.message(), "");
    }

    #[tokio::test]
    async fn test_transport_error_gets_generic_description() {
        let client = CompletionClient::new(ScriptedProvider::new(Err(LlmError::Transport(
            "connection refused".into(),
        ))));
        let result = client.complete(vec![], "m").await;
        let error = result.error().unwrap();
        assert!(!error.contains("connection refused"));
        assert!(error.contains("completion endpoint"));
    }

    #[tokio::test]
    async fn test_missing_credential_is_normalized() {
        let client = CompletionClient::new(ScriptedProvider::new(Err(LlmError::MissingCredential)));
        let result = client.complete(vec![], "m").await;
        assert!(result.is_failure());
    }
}
