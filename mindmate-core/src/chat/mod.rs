//! Chat gateway — one reply string from either of two LLM backends
//!
//! - **Local** — Ollama-style HTTP service (`/api/chat`, legacy `/api/generate`)
//! - **Hosted** — OpenAI-style chat completions with a bearer key
//!
//! `ChatGateway::complete` is total: provider failures come back as bracketed
//! text such as `[Greška Ollama: ...]` instead of an error, because the caller
//! is an interactive chat that always needs something to display.

pub mod hosted;
pub mod local;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MindMateConfig;
use crate::models::ChatRole;

pub use hosted::HostedChatClient;
pub use local::LocalChatClient;

/// One turn as sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing message content in first choice")]
    MissingChoice,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Unexpected reply body: expected a JSON object, got {0}")]
    UnexpectedReply(&'static str),
}

// ============================================================================
// Provider selection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Local,
    Hosted,
}

impl ProviderKind {
    /// Map a configured provider name. Unknown names select the local backend.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" | "hosted" => ProviderKind::Hosted,
            "ollama" | "local" => ProviderKind::Local,
            other => {
                tracing::warn!(provider = other, "Unknown chat provider, using local backend");
                ProviderKind::Local
            }
        }
    }
}

/// The two supported backends.
pub enum ChatProvider {
    Local(LocalChatClient),
    Hosted(HostedChatClient),
}

impl ChatProvider {
    pub async fn complete(&self, messages: &[ChatMessage]) -> String {
        match self {
            ChatProvider::Local(client) => client.complete(messages).await,
            ChatProvider::Hosted(client) => client.complete(messages).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChatProvider::Local(_) => "ollama",
            ChatProvider::Hosted(_) => "openai",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ChatProvider::Local(client) => client.model(),
            ChatProvider::Hosted(client) => client.model(),
        }
    }
}

// ============================================================================
// ChatGateway
// ============================================================================

pub struct ChatGateway {
    provider: ChatProvider,
    system_prompt: String,
}

impl ChatGateway {
    pub fn new(provider: ChatProvider, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build the provider selected by `[chat] provider`.
    pub fn from_config(config: &MindMateConfig) -> Result<Self, ChatError> {
        let timeout = Duration::from_secs(config.chat.request_timeout_seconds);

        let provider = match ProviderKind::from_name(&config.chat.provider) {
            ProviderKind::Local => ChatProvider::Local(LocalChatClient::new(
                &config.ollama.host,
                &config.ollama.model,
                timeout,
            )?),
            ProviderKind::Hosted => ChatProvider::Hosted(HostedChatClient::with_base_url(
                &config.openai.api_key,
                &config.openai.model,
                &config.openai.base_url,
                timeout,
            )?),
        };

        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            timeout_secs = timeout.as_secs(),
            "Chat gateway ready"
        );

        Ok(Self::new(provider, config.chat.system_prompt.clone()))
    }

    pub fn provider(&self) -> &ChatProvider {
        &self.provider
    }

    /// The system prompt followed by `history`.
    pub fn build_messages(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend_from_slice(history);
        messages
    }

    /// Reply to `history`. Never fails; errors are returned as bracketed text.
    pub async fn complete(&self, history: &[ChatMessage]) -> String {
        let messages = self.build_messages(history);
        tracing::debug!(
            provider = self.provider.name(),
            messages = messages.len(),
            "Requesting chat completion"
        );
        self.provider.complete(&messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_name() {
        assert_eq!(ProviderKind::from_name("openai"), ProviderKind::Hosted);
        assert_eq!(ProviderKind::from_name(" OpenAI "), ProviderKind::Hosted);
        assert_eq!(ProviderKind::from_name("hosted"), ProviderKind::Hosted);
        assert_eq!(ProviderKind::from_name("ollama"), ProviderKind::Local);
        assert_eq!(ProviderKind::from_name("local"), ProviderKind::Local);
        assert_eq!(ProviderKind::from_name("something-else"), ProviderKind::Local);
    }

    #[test]
    fn test_build_messages_prepends_system_prompt() {
        let client = HostedChatClient::new("", "gpt-4o-mini", Duration::from_secs(5)).unwrap();
        let gateway = ChatGateway::new(ChatProvider::Hosted(client), "budi ljubazan");

        let history = vec![ChatMessage::user("zdravo"), ChatMessage::assistant("ćao")];
        let messages = gateway.build_messages(&history);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], ChatMessage::system("budi ljubazan"));
        assert_eq!(&messages[1..], &history[..]);
    }

    #[test]
    fn test_from_config_selects_provider() {
        let mut config = MindMateConfig::default();
        let gateway = ChatGateway::from_config(&config).unwrap();
        assert_eq!(gateway.provider().name(), "ollama");
        assert_eq!(gateway.provider().model(), "llama3.1");

        config.chat.provider = "openai".to_string();
        let gateway = ChatGateway::from_config(&config).unwrap();
        assert_eq!(gateway.provider().name(), "openai");
        assert_eq!(gateway.provider().model(), "gpt-4o-mini");
    }

    #[test]
    fn test_chat_message_wire_shape() {
        let json = serde_json::to_value(ChatMessage::user("hej")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hej"}));
    }
}
