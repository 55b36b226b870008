//! Hosted chat backend (OpenAI-compatible `/chat/completions`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatError, ChatMessage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Returned instead of calling the API when no key is configured.
pub const MISSING_KEY_MARKER: &str = "[OPENAI_API_KEY nije postavljen]";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HostedChatClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl HostedChatClient {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self, ChatError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL, timeout)
    }

    /// Create a client against a custom base URL (tests, compatible gateways).
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reply text, [`MISSING_KEY_MARKER`] without a key, or
    /// `[Greška OpenAI: ...]` on any other failure.
    pub async fn complete(&self, messages: &[ChatMessage]) -> String {
        match self.try_complete(messages).await {
            Ok(reply) => reply,
            Err(ChatError::MissingApiKey) => MISSING_KEY_MARKER.to_string(),
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "OpenAI chat failed");
                format!("[Greška OpenAI: {}]", e)
            }
        }
    }

    pub async fn try_complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        if self.api_key.is_empty() {
            return Err(ChatError::MissingApiKey);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "OpenAI API error");

            return Err(ChatError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(ChatError::MissingChoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: &str) -> HostedChatClient {
        HostedChatClient::with_base_url(key, "gpt-4o-mini", &server.uri(), Duration::from_secs(5))
            .expect("Failed to create client")
    }

    fn history() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("Anksiozan sam.")]
    }

    #[tokio::test]
    async fn test_missing_key_returns_marker_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let reply = client(&server, "").complete(&history()).await;
        assert_eq!(reply, "[OPENAI_API_KEY nije postavljen]");

        let reply = client(&server, "   ").complete(&history()).await;
        assert_eq!(reply, MISSING_KEY_MARKER);
    }

    #[tokio::test]
    async fn test_completion_sends_bearer_and_trims_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "Anksiozan sam."}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "  Hajde da dišemo zajedno.\n"}},
                    {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server, "sk-test").complete(&history()).await;
        assert_eq!(reply, "Hajde da dišemo zajedno.");
    }

    #[tokio::test]
    async fn test_api_error_message_is_embedded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let reply = client(&server, "sk-bad").complete(&history()).await;
        assert_eq!(reply, "[Greška OpenAI: API error (401): Incorrect API key provided]");
    }

    #[tokio::test]
    async fn test_empty_choices_becomes_marker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let result = client(&server, "sk-test").try_complete(&history()).await;
        assert!(matches!(result, Err(ChatError::MissingChoice)));

        let reply = client(&server, "sk-test").complete(&history()).await;
        assert!(reply.starts_with("[Greška OpenAI: "), "got: {}", reply);
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_marker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let reply = client(&server, "sk-test").complete(&history()).await;
        assert!(reply.starts_with("[Greška OpenAI: HTTP request failed"), "got: {}", reply);
    }
}
