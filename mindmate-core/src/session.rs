//! Chat session: one uid's running conversation.
//!
//! `send` records the user turn, asks the gateway with the whole log and
//! records the reply. It always yields a displayable string.

use chrono::{DateTime, Utc};

use crate::chat::{ChatGateway, ChatMessage};
use crate::models::{ChatEvent, ChatRole, Snapshot};
use crate::store::EventStore;

/// Session identifier for a new visitor, `user_<unix seconds>`.
pub fn new_session_uid(now: DateTime<Utc>) -> String {
    format!("user_{}", now.timestamp())
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    uid: String,
    log: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            log: Vec::new(),
        }
    }

    /// Rebuild the conversation for `uid` from stored chat events.
    pub fn resume(uid: impl Into<String>, snapshot: &Snapshot) -> Self {
        let uid = uid.into();
        let log = snapshot
            .chat_events
            .iter()
            .filter(|e| e.uid == uid)
            .filter_map(|e| match e.chat_role() {
                Some(ChatRole::System) | None => None,
                Some(role) => Some(ChatMessage::new(role, e.content.clone())),
            })
            .collect();
        Self { uid, log }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    pub async fn send(&mut self, store: &mut EventStore, gateway: &ChatGateway, text: &str) -> String {
        self.record(store, ChatRole::User, text);

        let reply = gateway.complete(&self.log).await;

        self.record(store, ChatRole::Assistant, &reply);
        tracing::debug!(uid = %self.uid, turns = self.log.len(), "Chat turn recorded");
        reply
    }

    fn record(&mut self, store: &mut EventStore, role: ChatRole, text: &str) {
        let event = ChatEvent::new(self.uid.clone(), role, text);
        // The log keeps what was stored, so both stay within the content bound
        self.log.push(ChatMessage::new(role, event.content.clone()));
        store.append_chat_event(event);
    }
}
