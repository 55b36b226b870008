//! Dashboard metrics derived from a snapshot.
//!
//! Everything here is a pure function of the snapshot plus explicit clock
//! inputs (`now`, `today`), so results are reproducible in tests. Every
//! numeric output is clamped to its documented range before it is returned.
//!
//! - `compute_summary`  — active users, chat sessions, satisfaction %, retention %
//! - `compute_trend`    — last 12 check-ins as mood / productivity series
//! - `synthetic_trend`  — placeholder series for a store with no check-ins
//! - `compute_analytics` — full score history + check-in hour histogram

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;

use crate::models::{ChatRole, CheckinRecord, Snapshot};

/// Window for "recent" check-ins.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Satisfaction shown when there are no recent check-ins.
pub const SATISFACTION_FALLBACK_PCT: u32 = 92;

/// A check-in with total score at or below this counts as a good day.
pub const GOOD_DAY_MAX_TOTAL: i64 = 3;

/// Number of points in the trend series.
pub const TREND_POINTS: usize = 12;

pub const MOOD_RANGE: (i64, i64) = (40, 100);
pub const PRODUCTIVITY_RANGE: (i64, i64) = (35, 100);
pub const RETENTION_RANGE: (u32, u32) = (60, 99);

// ============================================================================
// Result types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Distinct non-empty uids across check-ins and chat events, never below 1.
    pub active_users: u32,
    /// Number of user chat turns.
    pub session_count: u32,
    /// Share of recent check-ins with a total score of 3 or less.
    pub satisfaction_pct: u32,
    /// Presentation heuristic only: grows by one point per five recent
    /// check-ins from a base of 60, capped at 99. It is not a cohort
    /// retention measurement and carries no statistical meaning.
    pub retention_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub labels: Vec<String>,
    pub productivity: Vec<u32>,
    pub mood: Vec<u32>,
    /// True when the series is the generated placeholder, not user data.
    pub synthetic: bool,
}

impl Trend {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorePoint {
    pub label: String,
    /// PHQ-2 + GAD-2 total, 0..=12.
    pub total: u32,
    pub mood: u32,
    pub productivity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub history: Vec<ScorePoint>,
    /// Check-in count per UTC hour of day.
    pub checkin_hours: [u32; 24],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub trend: Trend,
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parse a stored timestamp as naive UTC.
///
/// Accepts ISO-8601 with or without fractional seconds, with `T` or a space
/// separator, and a bare date (midnight). A `+HH:MM` offset or trailing `Z`
/// is dropped without conversion.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let base = raw.trim().split('+').next().unwrap_or_default();
    let base = base.strip_suffix('Z').unwrap_or(base);

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(base, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(base, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

enum RecordTime {
    Parsed(DateTime<Utc>),
    /// Timestamp missing or malformed.
    Unparseable,
}

fn record_time(record: &CheckinRecord) -> RecordTime {
    match parse_timestamp(&record.timestamp) {
        Some(dt) => RecordTime::Parsed(dt.and_utc()),
        None => RecordTime::Unparseable,
    }
}

/// Whether a check-in falls inside the trailing window ending at `now`.
///
/// Fail-open: an unparseable timestamp is taken to be `now`, so the record
/// always counts as recent. This matches the behaviour of existing
/// dashboards and is probably unintended upstream; it is kept as-is so
/// figures stay comparable.
fn is_recent(record: &CheckinRecord, now: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    let effective = match record_time(record) {
        RecordTime::Parsed(at) => at,
        RecordTime::Unparseable => {
            tracing::debug!(uid = %record.uid, ts = %record.timestamp, "Unparseable check-in timestamp, counting as recent");
            now
        }
    };
    effective >= cutoff
}

// ============================================================================
// Summary
// ============================================================================

pub fn compute_summary(snapshot: &Snapshot, now: DateTime<Utc>) -> Summary {
    let uids: HashSet<&str> = snapshot
        .checkins
        .iter()
        .map(|r| r.uid.as_str())
        .chain(snapshot.chat_events.iter().map(|e| e.uid.as_str()))
        .filter(|uid| !uid.is_empty())
        .collect();
    let active_users = (uids.len() as u32).max(1);

    let session_count = snapshot
        .chat_events
        .iter()
        .filter(|e| e.chat_role() == Some(ChatRole::User))
        .count() as u32;

    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent: Vec<&CheckinRecord> = snapshot
        .checkins
        .iter()
        .filter(|r| is_recent(r, now, cutoff))
        .collect();

    let satisfaction_pct = if recent.is_empty() {
        SATISFACTION_FALLBACK_PCT
    } else {
        let good = recent
            .iter()
            .filter(|r| r.total() <= GOOD_DAY_MAX_TOTAL)
            .count();
        // Half-way values round to even
        (100.0 * good as f64 / recent.len() as f64).round_ties_even() as u32
    };

    let retention_pct = (RETENTION_RANGE.0 + (recent.len() / 5) as u32).min(RETENTION_RANGE.1);

    Summary {
        active_users,
        session_count,
        satisfaction_pct: satisfaction_pct.min(100),
        retention_pct: retention_pct.clamp(RETENTION_RANGE.0, RETENTION_RANGE.1),
    }
}

// ============================================================================
// Trend
// ============================================================================

fn mood_for(total: i64) -> u32 {
    95i64
        .saturating_sub(total.saturating_mul(4))
        .clamp(MOOD_RANGE.0, MOOD_RANGE.1) as u32
}

fn productivity_for(total: i64, index: usize) -> u32 {
    let bonus = if index % 3 == 0 { 2 } else { 0 };
    92i64
        .saturating_sub(total.saturating_mul(3))
        .saturating_add(bonus)
        .clamp(PRODUCTIVITY_RANGE.0, PRODUCTIVITY_RANGE.1) as u32
}

/// Mood / productivity series over the last 12 check-ins ordered by
/// `(date, timestamp)`. Falls back to [`synthetic_trend`] when the store has
/// no check-ins.
pub fn compute_trend(snapshot: &Snapshot, today: NaiveDate) -> Trend {
    if snapshot.checkins.is_empty() {
        return synthetic_trend(today);
    }

    let mut rows: Vec<&CheckinRecord> = snapshot.checkins.iter().collect();
    rows.sort_by(|a, b| {
        (a.date.as_str(), a.timestamp.as_str()).cmp(&(b.date.as_str(), b.timestamp.as_str()))
    });
    let rows = &rows[rows.len().saturating_sub(TREND_POINTS)..];

    let mut trend = Trend {
        labels: Vec::with_capacity(rows.len()),
        productivity: Vec::with_capacity(rows.len()),
        mood: Vec::with_capacity(rows.len()),
        synthetic: false,
    };

    for (i, record) in rows.iter().enumerate() {
        let total = record.total();
        trend.labels.push(record.label());
        trend.mood.push(mood_for(total));
        trend.productivity.push(productivity_for(total, i));
    }

    trend
}

/// Placeholder series for an empty store: 12 trailing calendar days ending
/// `today`, a gentle sine wave with upward drift. Only exists so the landing
/// chart is never blank.
pub fn synthetic_trend(today: NaiveDate) -> Trend {
    let mut trend = Trend {
        labels: Vec::with_capacity(TREND_POINTS),
        productivity: Vec::with_capacity(TREND_POINTS),
        mood: Vec::with_capacity(TREND_POINTS),
        synthetic: true,
    };

    for i in 0..TREND_POINTS {
        let day = today - Duration::days((TREND_POINTS - 1 - i) as i64);
        trend.labels.push(day.format("%Y-%m-%d").to_string());

        let t = i as f64 / (TREND_POINTS - 1) as f64;
        let mood = 70.0 + 20.0 * (t * 3.14).sin() + 5.0 * t;
        let productivity = 65.0 + 18.0 * (t * 3.14 * 0.9).sin() + 7.0 * t;
        trend
            .mood
            .push((mood as i64).clamp(MOOD_RANGE.0, MOOD_RANGE.1) as u32);
        trend
            .productivity
            .push((productivity as i64).clamp(PRODUCTIVITY_RANGE.0, PRODUCTIVITY_RANGE.1) as u32);
    }

    trend
}

// ============================================================================
// Analytics
// ============================================================================

/// Every check-in ordered by date, with its total and derived series values.
pub fn compute_score_history(snapshot: &Snapshot) -> Vec<ScorePoint> {
    let mut rows: Vec<&CheckinRecord> = snapshot.checkins.iter().collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));

    rows.iter()
        .enumerate()
        .map(|(i, record)| {
            let total = record.total();
            ScorePoint {
                label: record.label(),
                total: total.clamp(0, 12) as u32,
                mood: mood_for(total),
                productivity: productivity_for(total, i),
            }
        })
        .collect()
}

/// Check-ins per hour of day. Records with unparseable timestamps are skipped.
pub fn checkin_hour_histogram(snapshot: &Snapshot) -> [u32; 24] {
    let mut hours = [0u32; 24];
    for record in &snapshot.checkins {
        if let RecordTime::Parsed(at) = record_time(record) {
            hours[at.hour() as usize] += 1;
        }
    }
    hours
}

/// Analytics view, or `None` when there are no check-ins yet.
pub fn compute_analytics(snapshot: &Snapshot) -> Option<Analytics> {
    if snapshot.checkins.is_empty() {
        return None;
    }
    Some(Analytics {
        history: compute_score_history(snapshot),
        checkin_hours: checkin_hour_histogram(snapshot),
    })
}

/// Landing page figures: summary plus trend.
pub fn compute_dashboard(snapshot: &Snapshot, now: DateTime<Utc>, today: NaiveDate) -> Dashboard {
    Dashboard {
        summary: compute_summary(snapshot, now),
        trend: compute_trend(snapshot, today),
    }
}

// ============================================================================
// TESTS
// ============================================================================
