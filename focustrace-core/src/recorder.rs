//! Activity recording boundary
//!
//! Ties together the event store, the metrics aggregator, and the feedback
//! policy. Event persistence and metrics aggregation are two independent
//! steps: once an event is stored it stays stored, even when the follow-up
//! merge fails. Merge failures are logged and surfaced on the returned
//! outcome; the caller decides whether to retry.

use crate::db::Database;
use crate::error::Result;
use crate::feedback::{Advisory, FeedbackPolicy, ThresholdPolicy};
use crate::metrics::MetricsAggregator;
use crate::types::{ActivityEvent, NewActivityEvent, UserMetrics};

/// Outcome of recording one activity event.
#[derive(Debug)]
pub struct RecordOutcome {
    /// The durably stored event
    pub event: ActivityEvent,
    /// Metrics after the merge, or None when the merge failed
    pub metrics: Option<UserMetrics>,
    /// Merge error message, when the merge failed
    pub merge_error: Option<String>,
}

/// Records activity events and answers metrics/feedback reads.
pub struct ActivityRecorder<'a> {
    db: &'a Database,
    aggregator: MetricsAggregator<'a>,
    policy: Box<dyn FeedbackPolicy + Send + Sync>,
}

impl<'a> ActivityRecorder<'a> {
    /// Recorder with the default aggregator settings and threshold policy.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            aggregator: MetricsAggregator::new(db),
            policy: Box::new(ThresholdPolicy),
        }
    }

    /// Recorder with aggregation settings taken from configuration.
    pub fn from_config(db: &'a Database, config: &crate::config::Config) -> Self {
        Self {
            db,
            aggregator: MetricsAggregator::with_settings(
                db,
                config.metrics.window_days,
                config.metrics.merge_retries,
            ),
            policy: Box::new(ThresholdPolicy),
        }
    }

    /// Recorder with a custom aggregator and feedback policy.
    pub fn with_parts(
        db: &'a Database,
        aggregator: MetricsAggregator<'a>,
        policy: Box<dyn FeedbackPolicy + Send + Sync>,
    ) -> Self {
        Self {
            db,
            aggregator,
            policy,
        }
    }

    /// Validate and store an event, then fold it into the user's metrics.
    ///
    /// Validation and storage errors propagate. A merge failure does not:
    /// the event write already happened and is never rolled back, so the
    /// failure is logged and reported on the outcome instead.
    pub fn record(&self, new: NewActivityEvent) -> Result<RecordOutcome> {
        let event = self.db.insert_event(&new)?;

        let (metrics, merge_error) =
            match self
                .aggregator
                .merge(&event.user_id, event.time_spent_secs, event.ts)
            {
                Ok(metrics) => (Some(metrics), None),
                Err(err) => {
                    tracing::error!(
                        user_id = %event.user_id,
                        event_id = event.id,
                        error = %err,
                        "Metrics merge failed after event was stored"
                    );
                    (None, Some(err.to_string()))
                }
            };

        Ok(RecordOutcome {
            event,
            metrics,
            merge_error,
        })
    }

    /// Current metrics document for a user, if any.
    pub fn metrics(&self, user_id: &str) -> Result<Option<UserMetrics>> {
        self.db.get_metrics(user_id)
    }

    /// Advisory feedback for a user's current metrics.
    pub fn feedback(&self, user_id: &str) -> Result<Advisory> {
        let metrics = self.db.get_metrics(user_id)?;
        Ok(self.policy.select(metrics.as_ref()))
    }

    /// Most recent events for a user, newest first.
    pub fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityEvent>> {
        self.db.recent_events(user_id, limit)
    }
}
