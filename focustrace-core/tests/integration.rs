//! Integration tests for the focustrace recording and aggregation flow
//!
//! These tests exercise the full record → aggregate → feedback path
//! against a real SQLite database.

use chrono::{Duration, TimeZone, Utc};
use focustrace_core::db::Database;
use focustrace_core::metrics::window::window_total;
use focustrace_core::metrics::MetricsAggregator;
use focustrace_core::{ActivityKind, ActivityRecorder, NewActivityEvent};
use tempfile::TempDir;

fn event_at(user_id: &str, secs: i64, ts: chrono::DateTime<Utc>) -> NewActivityEvent {
    NewActivityEvent {
        user_id: user_id.to_string(),
        time_spent_secs: secs,
        kind: ActivityKind::FocusSession,
        attributes: serde_json::json!({"url": "https://docs.rs", "title": "docs"}),
        ts: Some(ts),
    }
}

fn day(d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 10, 0, 0).unwrap()
}

// ============================================
// Record → aggregate flow
// ============================================

#[test]
fn test_record_flow_end_to_end() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let recorder = ActivityRecorder::new(&db);

    let outcome = recorder.record(event_at("u1", 1500, day(10))).unwrap();
    assert!(outcome.merge_error.is_none());
    assert_eq!(outcome.event.time_spent_secs, 1500);

    let metrics = recorder.metrics("u1").unwrap().unwrap();
    assert_eq!(metrics.total_focus_secs, 1500);
    assert_eq!(metrics.daily_focus.len(), 1);

    let events = recorder.recent_events("u1", 20).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].attributes["url"], "https://docs.rs");
}

#[test]
fn test_persistence_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    {
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        let recorder = ActivityRecorder::new(&db);
        recorder.record(event_at("u1", 3600, day(10))).unwrap();
    }

    let db = Database::open(&path).unwrap();
    db.migrate().unwrap();
    let recorder = ActivityRecorder::new(&db);
    let metrics = recorder.metrics("u1").unwrap().unwrap();
    assert_eq!(metrics.total_focus_secs, 3600);
    assert_eq!(db.event_count("u1").unwrap(), 1);
}

#[test]
fn test_same_day_events_share_a_bucket() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let recorder = ActivityRecorder::new(&db);

    recorder.record(event_at("u1", 600, day(10))).unwrap();
    recorder
        .record(event_at("u1", 900, day(10) + Duration::hours(5)))
        .unwrap();

    let metrics = recorder.metrics("u1").unwrap().unwrap();
    assert_eq!(metrics.daily_focus.len(), 1);
    assert_eq!(metrics.daily_focus[0].focus_secs, 1500);
    assert_eq!(metrics.total_focus_secs, 1500);
}

#[test]
fn test_duplicate_delivery_adds_extra_time() {
    // At-least-once delivery: duplicates are not deduplicated
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let recorder = ActivityRecorder::new(&db);

    let event = event_at("u1", 600, day(10));
    recorder.record(event.clone()).unwrap();
    recorder.record(event).unwrap();

    let metrics = recorder.metrics("u1").unwrap().unwrap();
    assert_eq!(metrics.total_focus_secs, 1200);
    assert_eq!(db.event_count("u1").unwrap(), 2);
}

#[test]
fn test_window_invariants_over_long_history() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let agg = MetricsAggregator::new(&db);

    // 45 days of activity, delivered partly out of order
    let mut days: Vec<u32> = (1..=45).collect();
    days.reverse();
    for d in days {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + Duration::days((d - 1) as i64);
        agg.merge("u1", 60 * d as i64, ts).unwrap();
    }

    let metrics = db.get_metrics("u1").unwrap().unwrap();
    assert_eq!(metrics.daily_focus.len(), 30);
    assert!(metrics
        .daily_focus
        .windows(2)
        .all(|w| w[0].date < w[1].date));
    assert_eq!(metrics.total_focus_secs, window_total(&metrics.daily_focus));
    // Only the newest 30 days survive: days 16..=45
    assert_eq!(metrics.total_focus_secs, (16..=45).map(|d| 60 * d).sum::<i64>());
}

// ============================================
// Feedback flow
// ============================================

#[test]
fn test_feedback_transitions_with_activity() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let recorder = ActivityRecorder::new(&db);

    // No data yet
    assert_eq!(recorder.feedback("u1").unwrap().area, "Data Collection");

    // One short day: under 2 hours
    recorder.record(event_at("u1", 3600, day(10))).unwrap();
    assert_eq!(recorder.feedback("u1").unwrap().area, "Morning Focus");

    // A solid day: 3 hours on the latest day, total still under 5
    recorder.record(event_at("u1", 10800, day(11))).unwrap();
    assert_eq!(recorder.feedback("u1").unwrap().area, "Consistency");

    // Push the total past 5 hours
    recorder.record(event_at("u1", 14400, day(12))).unwrap();
    assert_eq!(recorder.feedback("u1").unwrap().area, "Work-Life Balance");
}

#[test]
fn test_feedback_messages_carry_one_decimal_hours() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let recorder = ActivityRecorder::new(&db);

    // 5400s = 1.5h on a single day
    recorder.record(event_at("u1", 5400, day(10))).unwrap();
    let advisory = recorder.feedback("u1").unwrap();
    assert_eq!(advisory.area, "Morning Focus");
    assert!(advisory.feedback.contains("1.5 hours"));
    assert_eq!(advisory.action, "Apply feedback immediately.");
}

// ============================================
// Concurrency
// ============================================

#[test]
fn test_concurrent_merges_lose_no_updates() {
    use std::sync::Arc;

    let db = Arc::new(Database::open_in_memory().unwrap());
    db.migrate().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            std::thread::spawn(move || {
                // High retry bound: four writers hammering one document
                let agg = MetricsAggregator::with_settings(&db, 30, 1000);
                for i in 0..25 {
                    let ts = day(10) + Duration::hours((t * 25 + i) % 3);
                    agg.merge("u1", 10, ts).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = db.get_metrics("u1").unwrap().unwrap();
    // 100 merges of 10 seconds each, all on the same day
    assert_eq!(metrics.total_focus_secs, 1000);
    assert_eq!(metrics.daily_focus.len(), 1);
    assert_eq!(metrics.revision, 100);
}
