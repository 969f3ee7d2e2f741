//! Rolling-window merge over daily focus buckets
//!
//! Pure functions only; persistence and retry live in [`super::aggregator`].
//!
//! Invariants maintained by [`merge_into_window`]:
//! - the window is sorted ascending by date
//! - the window holds at most `window_days` buckets (oldest evicted first)
//! - `total_focus_secs` equals the sum of the post-truncation window

use crate::types::{DailyFocusBucket, UserMetrics, WINDOW_DAYS};
use chrono::{DateTime, Duration, Utc};

/// Merge one event's duration into the user's rolling window.
///
/// Finds the bucket matching the UTC calendar day of `event_ts` and adds
/// `time_spent_secs` to it, or appends a fresh bucket. Events may arrive
/// out of chronological order, so the window is re-sorted before the
/// oldest buckets are evicted. Derived fields are fully recomputed; after
/// eviction an incrementally patched total would drift.
pub fn merge_into_window(
    metrics: &mut UserMetrics,
    time_spent_secs: i64,
    event_ts: DateTime<Utc>,
    window_days: usize,
) {
    let day_key = event_ts.date_naive();

    match metrics.daily_focus.iter_mut().find(|b| b.date == day_key) {
        Some(bucket) => bucket.focus_secs += time_spent_secs,
        None => metrics
            .daily_focus
            .push(DailyFocusBucket::seeded(day_key, time_spent_secs)),
    }

    metrics.daily_focus.sort_by_key(|b| b.date);

    if metrics.daily_focus.len() > window_days {
        let drop = metrics.daily_focus.len() - window_days;
        metrics.daily_focus.drain(..drop);
    }

    metrics.total_focus_secs = window_total(&metrics.daily_focus);
    metrics.last_week_focus_hours = last_week_hours(&metrics.daily_focus, event_ts);
    metrics.last_updated = Utc::now();
}

/// Sum of focus seconds over a window.
pub fn window_total(window: &[DailyFocusBucket]) -> i64 {
    window.iter().map(|b| b.focus_secs).sum()
}

/// Focus hours accumulated over the 7 calendar days ending at `now`.
fn last_week_hours(window: &[DailyFocusBucket], now: DateTime<Utc>) -> f64 {
    let cutoff = now.date_naive() - Duration::days(6);
    let secs: i64 = window
        .iter()
        .filter(|b| b.date >= cutoff)
        .map(|b| b.focus_secs)
        .sum();
    secs as f64 / 3600.0
}

/// Default-window convenience used by the aggregator when no config override
/// is in play.
pub fn merge_default(metrics: &mut UserMetrics, time_spent_secs: i64, event_ts: DateTime<Utc>) {
    merge_into_window(metrics, time_spent_secs, event_ts, WINDOW_DAYS)
}
