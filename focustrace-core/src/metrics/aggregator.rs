//! Metrics aggregation
//!
//! One merge pass per recorded event: fetch-or-create the user's metrics
//! document, fold the event into the rolling window, and write the result
//! back with a compare-and-swap on the document revision.
//!
//! Concurrent merges for the same user can interleave between load and
//! store. The revision check turns that race into a failed conditional
//! write; the loser reloads and re-merges. Cross-user merges never
//! contend, documents are keyed per user.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::UserMetrics;
use chrono::{DateTime, Utc};

use super::window;

/// Default number of reload-and-retry rounds before giving up.
pub const DEFAULT_MERGE_RETRIES: usize = 5;

/// Folds activity events into per-user rolling focus metrics.
pub struct MetricsAggregator<'a> {
    db: &'a Database,
    window_days: usize,
    max_retries: usize,
}

impl<'a> MetricsAggregator<'a> {
    /// Aggregator with the standard 30-day window.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            window_days: crate::types::WINDOW_DAYS,
            max_retries: DEFAULT_MERGE_RETRIES,
        }
    }

    /// Aggregator with explicit window and retry settings (from config).
    pub fn with_settings(db: &'a Database, window_days: usize, max_retries: usize) -> Self {
        Self {
            db,
            window_days,
            max_retries,
        }
    }

    /// Merge one event's duration into the user's metrics document.
    ///
    /// After a successful return the stored document satisfies:
    /// - `total_focus_secs` equals the sum of the visible window
    /// - the window holds at most `window_days` buckets, ascending by date
    pub fn merge(
        &self,
        user_id: &str,
        time_spent_secs: i64,
        event_ts: DateTime<Utc>,
    ) -> Result<UserMetrics> {
        for attempt in 0..self.max_retries {
            let mut metrics = self
                .db
                .get_metrics(user_id)?
                .unwrap_or_else(|| UserMetrics::empty(user_id));

            window::merge_into_window(&mut metrics, time_spent_secs, event_ts, self.window_days);
            metrics.revision += 1;

            if self.db.try_store_metrics(&metrics)? {
                tracing::debug!(
                    user_id,
                    time_spent_secs,
                    total = metrics.total_focus_secs,
                    buckets = metrics.daily_focus.len(),
                    "Merged activity into metrics"
                );
                return Ok(metrics);
            }

            tracing::debug!(user_id, attempt, "Metrics write conflict, retrying");
        }

        Err(Error::Conflict {
            user_id: user_id.to_string(),
        })
    }
}
