//! Integration tests for the event store and the metrics read path
//!
//! Each test works on a fresh temp directory and reopens the store from disk
//! to check what was actually persisted.

use mindmate_core::models::{ChatRole, NOTES_MAX_CHARS};
use mindmate_core::store::read_snapshot;
use mindmate_core::{
    ChatEvent, CheckinRecord, CheckinScores, EventStore, MindMate, MindMateConfig,
};

#[test]
fn test_checkin_round_trip_preserves_scores() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindmate_db.json");

    let record = CheckinRecord::new("user_1700000000", CheckinScores::new(0, 1, 2, 3), "Dobar dan");
    {
        let mut store = EventStore::load(&path);
        store.append_checkin(record.clone());
    }

    let reopened = EventStore::load(&path);
    assert_eq!(reopened.snapshot().checkins, vec![record]);
    let stored = &reopened.snapshot().checkins[0];
    assert_eq!((stored.phq1, stored.phq2, stored.gad1, stored.gad2), (0, 1, 2, 3));
    assert_eq!(stored.notes, "Dobar dan");
}

#[test]
fn test_checkin_round_trip_truncates_long_notes_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindmate_db.json");

    let long = "ž".repeat(NOTES_MAX_CHARS + 10);
    let mut store = EventStore::load(&path);
    store.append_checkin(CheckinRecord::new("u", CheckinScores::default(), &long));
    store.append_checkin(CheckinRecord::new("u", CheckinScores::default(), "kratko"));

    let on_disk = read_snapshot(&path).unwrap();
    assert_eq!(on_disk.checkins[0].notes.chars().count(), NOTES_MAX_CHARS);
    assert_eq!(on_disk.checkins[1].notes, "kratko");
}

#[test]
fn test_existing_legacy_document_is_extended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mindmate_db.json");
    std::fs::write(
        &path,
        r#"{
  "checkins": [
    {"uid": "user_1", "ts": "2025-05-01T08:00:00.000001", "date": "2025-05-01",
     "phq1": 1, "phq2": 0, "gad1": 2, "gad2": 1, "notes": ""}
  ],
  "chat_events": [
    {"uid": "user_1", "ts": "2025-05-01T08:01:00.000001", "role": "user", "content": "Ćao"}
  ]
}"#,
    )
    .unwrap();

    let mut store = EventStore::load(&path);
    assert_eq!(store.snapshot().checkins.len(), 1);
    assert_eq!(store.snapshot().chat_events[0].content, "Ćao");

    store.append_chat_event(ChatEvent::new("user_1", ChatRole::Assistant, "Zdravo!"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["checkins"][0]["ts"], "2025-05-01T08:00:00.000001");
    assert_eq!(raw["chat_events"].as_array().unwrap().len(), 2);
    assert_eq!(raw["chat_events"][1]["role"], "assistant");
}

#[test]
fn test_mindmate_open_submit_and_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = MindMateConfig::default();
    config.store.path = dir.path().join("db.json").to_string_lossy().to_string();

    let mut app = MindMate::open(config.clone()).unwrap();

    let empty = app.dashboard();
    assert!(empty.trend.synthetic);
    assert_eq!(empty.summary.satisfaction_pct, 92);
    assert!(app.analytics().is_none());

    let record = app.submit_checkin("user_42", CheckinScores::new(0, 0, 0, 0), "");
    assert_eq!(record.total(), 0);

    let dashboard = app.dashboard();
    assert_eq!(dashboard.summary.active_users, 1);
    assert_eq!(dashboard.summary.satisfaction_pct, 100);
    assert!(!dashboard.trend.synthetic);
    assert_eq!(dashboard.trend.len(), 1);
    assert_eq!(dashboard.trend.mood, vec![95]);

    let analytics = app.analytics().unwrap();
    assert_eq!(analytics.history.len(), 1);
    assert_eq!(analytics.checkin_hours.iter().sum::<u32>(), 1);

    // A second process sees the same data
    let reopened = MindMate::open(config).unwrap();
    assert_eq!(reopened.store.snapshot().checkins.len(), 1);
}
