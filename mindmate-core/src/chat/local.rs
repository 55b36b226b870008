//! Local chat backend (Ollama HTTP API).
//!
//! Tries `/api/chat` first. Servers that predate it answer 404, in which case
//! the history is flattened into one role-tagged prompt and sent once to
//! `/api/generate`. Replies may be a single JSON object or newline-delimited
//! JSON chunks; chunk contents are concatenated.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::{ChatError, ChatMessage};
use crate::models::ChatRole;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Clone)]
pub struct LocalChatClient {
    client: Client,
    host: String,
    model: String,
}

impl LocalChatClient {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reply text, or `[Greška Ollama: ...]` on any failure.
    pub async fn complete(&self, messages: &[ChatMessage]) -> String {
        match self.try_complete(messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "Ollama chat failed");
                format!("[Greška Ollama: {}]", e)
            }
        }
    }

    pub async fn try_complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: false,
            })
            .send()
            .await?;

        let response = if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(host = %self.host, "/api/chat not found, falling back to /api/generate");
            self.client
                .post(format!("{}/api/generate", self.host))
                .json(&GenerateRequest {
                    model: &self.model,
                    prompt: flatten_prompt(messages),
                    stream: false,
                })
                .send()
                .await?
        } else {
            response
        };

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Api {
                code: status.as_u16(),
                message: body,
            });
        }

        parse_reply(&body)
    }
}

/// Render the history as `[TAG]: content` lines for `/api/generate`.
pub fn flatten_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        let tag = match message.role {
            ChatRole::System => "SISTEM",
            ChatRole::User => "KORISNIK",
            ChatRole::Assistant => "ASISTENT",
        };
        prompt.push_str(&format!("[{}]: {}\n", tag, message.content));
    }
    prompt
}

fn fragment(value: &Value) -> Option<&str> {
    value
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| value.get("response").and_then(Value::as_str))
}

/// Extract reply text from a `/api/chat` or `/api/generate` body.
///
/// A single JSON object yields its `message.content` (or `response`). Any
/// other single JSON value is an error. A newline-delimited stream yields
/// every chunk's fragment concatenated, and a body that is not JSON at all
/// is returned as-is.
pub fn parse_reply(body: &str) -> Result<String, ChatError> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return match value {
            Value::Object(_) => Ok(fragment(&value).unwrap_or_default().to_string()),
            Value::Array(_) => Err(ChatError::UnexpectedReply("an array")),
            Value::String(_) => Err(ChatError::UnexpectedReply("a string")),
            Value::Number(_) => Err(ChatError::UnexpectedReply("a number")),
            Value::Bool(_) => Err(ChatError::UnexpectedReply("a boolean")),
            Value::Null => Err(ChatError::UnexpectedReply("null")),
        };
    }

    let mut reply = String::new();
    let mut saw_object = false;
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(line) {
            saw_object = true;
            if let Some(part) = fragment(&value) {
                reply.push_str(part);
            }
        }
    }

    if saw_object {
        Ok(reply)
    } else {
        Ok(body.to_string())
    }
}
