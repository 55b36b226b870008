use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{coerce_int, coerce_string, format_timestamp, truncate_chars};

/// Upper bound of each PHQ-2 / GAD-2 item.
pub const SCORE_MAX: i64 = 3;

/// Maximum stored length of check-in notes, in characters.
pub const NOTES_MAX_CHARS: usize = 2000;

/// The four item scores of a check-in, clamped into `0..=SCORE_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckinScores {
    pub phq1: i64,
    pub phq2: i64,
    pub gad1: i64,
    pub gad2: i64,
}

impl CheckinScores {
    pub fn new(phq1: i64, phq2: i64, gad1: i64, gad2: i64) -> Self {
        let clamp = |v: i64| v.clamp(0, SCORE_MAX);
        Self {
            phq1: clamp(phq1),
            phq2: clamp(phq2),
            gad1: clamp(gad1),
            gad2: clamp(gad2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CheckinRecord {
    pub uid: String,
    #[serde(rename = "ts")]
    pub timestamp: String,
    /// Local calendar date at creation. Can differ from the UTC date of
    /// `timestamp` around midnight.
    pub date: String,
    pub phq1: i64,
    pub phq2: i64,
    pub gad1: i64,
    pub gad2: i64,
    pub notes: String,
}

impl CheckinRecord {
    pub fn new(uid: impl Into<String>, scores: CheckinScores, notes: &str) -> Self {
        Self::at(uid, scores, notes, Local::now())
    }

    pub fn at(
        uid: impl Into<String>,
        scores: CheckinScores,
        notes: &str,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            uid: uid.into(),
            timestamp: format_timestamp(created_at.with_timezone(&Utc)),
            date: created_at.date_naive().format("%Y-%m-%d").to_string(),
            phq1: scores.phq1,
            phq2: scores.phq2,
            gad1: scores.gad1,
            gad2: scores.gad2,
            notes: truncate_chars(notes, NOTES_MAX_CHARS),
        }
    }

    /// Decode one stored record. Fields are coerced, never rejected; only a
    /// non-object entry yields `None`. Stored values are kept as found (no
    /// clamping or truncation on read).
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            uid: coerce_string(obj.get("uid")),
            timestamp: coerce_string(obj.get("ts")),
            date: coerce_string(obj.get("date")),
            phq1: coerce_int(obj.get("phq1")),
            phq2: coerce_int(obj.get("phq2")),
            gad1: coerce_int(obj.get("gad1")),
            gad2: coerce_int(obj.get("gad2")),
            notes: coerce_string(obj.get("notes")),
        })
    }

    /// Sum of the four item scores (0..=12 for in-range records). Saturates
    /// for out-of-range stored values.
    pub fn total(&self) -> i64 {
        self.phq1
            .saturating_add(self.phq2)
            .saturating_add(self.gad1)
            .saturating_add(self.gad2)
    }

    /// Chart label: the date, else the timestamp's date part, else empty.
    pub fn label(&self) -> String {
        if !self.date.is_empty() {
            self.date.clone()
        } else {
            self.timestamp.chars().take(10).collect()
        }
    }
}
