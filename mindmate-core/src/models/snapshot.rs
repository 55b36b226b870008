use serde::Serialize;
use serde_json::Value;

use super::{ChatEvent, CheckinRecord};

/// Full state of the event store: the persisted document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Snapshot {
    pub checkins: Vec<CheckinRecord>,
    pub chat_events: Vec<ChatEvent>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.checkins.is_empty() && self.chat_events.is_empty()
    }

    /// Decode a snapshot document record by record. A missing or non-array
    /// collection is empty; an entry that is not an object is skipped with a
    /// warning and the rest of the document is kept.
    pub fn from_value(document: &Value) -> Self {
        Self {
            checkins: decode_records(document, "checkins", CheckinRecord::from_value),
            chat_events: decode_records(document, "chat_events", ChatEvent::from_value),
        }
    }
}

fn decode_records<T>(document: &Value, key: &str, decode: fn(&Value) -> Option<T>) -> Vec<T> {
    let entries = match document.get(key) {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            tracing::warn!(collection = key, "Snapshot collection is not an array, ignoring it");
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let record = decode(entry);
            if record.is_none() {
                tracing::warn!(collection = key, index, "Skipping malformed snapshot entry");
            }
            record
        })
        .collect()
}
