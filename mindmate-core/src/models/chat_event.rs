use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{coerce_string, format_timestamp, truncate_chars};

/// Maximum stored length of a chat turn, in characters.
pub const CONTENT_MAX_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    #[default]
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    /// Exact, lowercase role names only.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// One stored chat turn. `role` keeps the stored text so events written
/// with an unfamiliar role survive a load/persist cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChatEvent {
    pub uid: String,
    #[serde(rename = "ts")]
    pub timestamp: String,
    pub role: String,
    pub content: String,
}

impl ChatEvent {
    pub fn new(uid: impl Into<String>, role: ChatRole, content: &str) -> Self {
        Self::at(uid, role, content, Utc::now())
    }

    pub fn at(uid: impl Into<String>, role: ChatRole, content: &str, at: DateTime<Utc>) -> Self {
        Self {
            uid: uid.into(),
            timestamp: format_timestamp(at),
            role: role.as_str().to_string(),
            content: truncate_chars(content, CONTENT_MAX_CHARS),
        }
    }

    /// Decode one stored event, coercing fields. Only a non-object entry
    /// yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            uid: coerce_string(obj.get("uid")),
            timestamp: coerce_string(obj.get("ts")),
            role: coerce_string(obj.get("role")),
            content: coerce_string(obj.get("content")),
        })
    }

    /// The typed role, or `None` for a role this build does not know.
    pub fn chat_role(&self) -> Option<ChatRole> {
        ChatRole::from_name(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_truncated_to_bound() {
        let event = ChatEvent::new("u", ChatRole::User, &"a".repeat(5000));
        assert_eq!(event.content.chars().count(), CONTENT_MAX_CHARS);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let event = ChatEvent::new("u", ChatRole::Assistant, "zdravo");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "zdravo");
        assert!(json["ts"].is_string());
        assert_eq!(event.chat_role(), Some(ChatRole::Assistant));
    }

    #[test]
    fn test_unknown_role_is_kept_verbatim() {
        let value = serde_json::json!({"uid": "u", "role": "tool", "content": null});
        let event = ChatEvent::from_value(&value).unwrap();
        assert_eq!(event.role, "tool");
        assert_eq!(event.chat_role(), None);
        assert_eq!(event.content, "");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["role"], "tool");
    }
}
