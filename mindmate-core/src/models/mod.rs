pub mod chat_event;
pub mod checkin;
pub mod snapshot;

pub use chat_event::{ChatEvent, ChatRole, CONTENT_MAX_CHARS};
pub use checkin::{CheckinRecord, CheckinScores, NOTES_MAX_CHARS, SCORE_MAX};
pub use snapshot::Snapshot;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Naive UTC ISO-8601 with microseconds, e.g. `2026-10-18T09:15:02.123456`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Read a stored score the way older documents wrote it: integers, floats
/// (truncated toward zero), numeric strings and booleans. Anything else is 0.
pub fn coerce_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0)
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// Read a stored text field. Missing and `null` become empty; scalars are
/// rendered as text.
pub fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
