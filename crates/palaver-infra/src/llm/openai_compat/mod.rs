//! OpenAI-compatible completion provider.
//!
//! Sends one `POST {base_url}/chat/completions` per request with a bearer
//! credential and maps the outcome onto [`LlmError`]:
//!
//! - no credential configured: `MissingCredential`, nothing is sent
//! - connection failure, timeout or unparseable success body: `Transport`
//! - non-2xx status: `Endpoint`, carrying the body's `error.message` when present
//!
//! The credential is wrapped in [`secrecy::SecretString`] and is only
//! exposed when building the `Authorization` header.

pub mod config;
pub mod types;

use secrecy::ExposeSecret;
use tracing::debug;

use palaver_core::llm::provider::CompletionProvider;
use palaver_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use self::config::OpenAiCompatConfig;
use self::types::{ChatCompletionResponse, error_message};

/// Provider for any endpoint speaking the OpenAI chat-completions protocol.
///
/// Does NOT derive Debug so the credential cannot leak through it.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create reqwest client");

        Self { client, config }
    }

    /// OpenAI with default settings.
    pub fn openai(api_key: Option<secrecy::SecretString>) -> Self {
        Self::new(config::openai_defaults(api_key))
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(LlmError::MissingCredential)?;

        let url = self.url();
        debug!(url = %url, model = %request.model, "POST chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Endpoint {
                status: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
                message: error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to parse response: {e}")))?;

        parsed
            .into_completion()
            .ok_or_else(|| LlmError::Transport("response contained no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::llm::client::CompletionClient;
    use palaver_types::llm::RemoteInstruction;
    use secrecy::SecretString;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4-turbo".to_string(),
            messages: vec![
                RemoteInstruction::developer("You are helpful."),
                RemoteInstruction::user("hello"),
            ],
        }
    }

    fn provider(base_url: &str, key: Option<&str>) -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::openai(key.map(SecretString::from)).with_base_url(base_url)
    }

    #[test]
    fn test_provider_name_and_url() {
        let p = provider("http://localhost:9/v1/", Some("k"));
        assert_eq!(p.name(), "openai");
        assert_eq!(p.url(), "http://localhost:9/v1/chat/completions");
        assert!(p.has_credential());
    }

    #[tokio::test]
    async fn test_success_maps_content_and_metadata() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4-turbo",
                "messages": [
                    {"role": "developer", "content": "You are helpful."},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "model": "gpt-4-turbo-2024-04-09",
                    "system_fingerprint": "fp_1",
                    "choices": [{"message": {"role": "assistant", "content": "Hi!"}}],
                    "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
                }"#,
            )
            .create_async()
            .await;

        let response = provider(&server.url(), Some("test-key"))
            .complete(&request())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "Hi!");
        assert_eq!(response.usage.unwrap().total_tokens, 12);
        assert_eq!(response.model.as_deref(), Some("gpt-4-turbo-2024-04-09"));
        assert_eq!(response.system_fingerprint.as_deref(), Some("fp_1"));
    }

    #[tokio::test]
    async fn test_unauthorized_surfaces_endpoint_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "invalid key", "type": "invalid_request_error"}}"#)
            .create_async()
            .await;

        let client = CompletionClient::new(provider(&server.url(), Some("bad-key")));
        let result = client
            .complete(request().messages, "gpt-4-turbo")
            .await;

        assert!(result.is_failure());
        assert_eq!(result.message(), "");
        assert_eq!(result.error(), Some("invalid key"));
    }

    #[tokio::test]
    async fn test_server_error_without_body_synthesizes_description() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let err = provider(&server.url(), Some("k"))
            .complete(&request())
            .await
            .unwrap_err();

        match &err {
            LlmError::Endpoint { status, message, .. } => {
                assert_eq!(*status, 500);
                assert!(message.is_none());
            }
            other => panic!("expected endpoint error, got {other:?}"),
        }
        assert_eq!(err.describe(), "API Error: 500 - Internal Server Error");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let err = provider(&server.url(), Some("k"))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = provider(&server.url(), Some("k"))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let err = provider(&server.url(), None)
            .complete(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MissingCredential));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 1 is reserved and refuses connections.
        let err = provider("http://127.0.0.1:1", Some("k"))
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
        assert_eq!(
            err.describe(),
            "Unable to reach the completion endpoint or read its response."
        );
    }
}
