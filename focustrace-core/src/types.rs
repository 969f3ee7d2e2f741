//! Core domain types for focustrace
//!
//! These types represent the canonical data model for browser activity
//! tracking and the derived per-user focus metrics.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Activity event** | One recorded interval of user activity with a duration and kind |
//! | **Daily bucket** | Aggregated focus time for one calendar day |
//! | **Rolling window** | The most recent 30 daily buckets retained per user |
//! | **Advisory** | A static feedback message selected by threshold rules |
//!
//! Day boundaries are UTC everywhere: a bucket's `date` is the event
//! timestamp truncated with [`chrono::DateTime::date_naive`]. Clients in
//! other timezones see consistent, if shifted, day boundaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of daily buckets retained per user.
pub const WINDOW_DAYS: usize = 30;

/// Placeholder focus score for new daily buckets.
///
/// The upstream data source does not yet deliver per-event focus scores,
/// so new buckets carry this fixed value until real scoring lands.
pub const PLACEHOLDER_FOCUS_SCORE: f64 = 8.5;

// ============================================
// Activity events
// ============================================

/// Kind of recorded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Sustained attention on a single tab
    FocusSession,
    /// Time on a known distracting site
    Distraction,
    /// Deliberate pause
    Break,
    /// Rapid switching between tabs
    TabSwitch,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::FocusSession => "focus_session",
            ActivityKind::Distraction => "distraction",
            ActivityKind::Break => "break",
            ActivityKind::TabSwitch => "tab_switch",
        }
    }
}

impl std::str::FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus_session" => Ok(ActivityKind::FocusSession),
            "distraction" => Ok(ActivityKind::Distraction),
            "break" => Ok(ActivityKind::Break),
            "tab_switch" => Ok(ActivityKind::TabSwitch),
            _ => Err(format!("unknown activity kind: {}", s)),
        }
    }
}

/// A recorded activity event, immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Database row id
    pub id: i64,
    /// Owning user (opaque identifier)
    pub user_id: String,
    /// Seconds spent in the activity
    pub time_spent_secs: i64,
    /// Kind of activity
    pub kind: ActivityKind,
    /// Free-form attributes (URL, window title, score, ...)
    pub attributes: serde_json::Value,
    /// When the activity occurred
    pub ts: DateTime<Utc>,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

/// Payload for recording a new activity event.
///
/// `ts` defaults to the insertion time when absent, matching clients that
/// report activity as it happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivityEvent {
    pub user_id: String,
    pub time_spent_secs: i64,
    pub kind: ActivityKind,
    #[serde(default = "default_attributes")]
    pub attributes: serde_json::Value,
    #[serde(default)]
    pub ts: Option<DateTime<Utc>>,
}

fn default_attributes() -> serde_json::Value {
    serde_json::json!({})
}

impl NewActivityEvent {
    /// Validate the payload before any storage write.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.user_id.is_empty() {
            return Err(crate::error::Error::Validation(
                "user_id must not be empty".to_string(),
            ));
        }
        if self.time_spent_secs < 0 {
            return Err(crate::error::Error::Validation(format!(
                "time_spent_secs must be non-negative, got {}",
                self.time_spent_secs
            )));
        }
        Ok(())
    }
}

// ============================================
// Derived metrics
// ============================================

/// Aggregated focus time for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFocusBucket {
    /// UTC calendar day
    pub date: NaiveDate,
    /// Accumulated seconds for the day; non-decreasing across merges
    pub focus_secs: i64,
    /// Distraction counter (placeholder, see PLACEHOLDER_FOCUS_SCORE note)
    pub distraction_count: i64,
    /// Average focus score (placeholder)
    pub avg_focus_score: f64,
}

impl DailyFocusBucket {
    /// A fresh bucket seeded with one event's duration.
    pub fn seeded(date: NaiveDate, focus_secs: i64) -> Self {
        Self {
            date,
            focus_secs,
            distraction_count: 0,
            avg_focus_score: PLACEHOLDER_FOCUS_SCORE,
        }
    }
}

/// Per-user rolling focus summary. Exactly one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMetrics {
    /// Owning user (unique key)
    pub user_id: String,
    /// Rolling window, ascending by date, at most [`WINDOW_DAYS`] entries
    pub daily_focus: Vec<DailyFocusBucket>,
    /// Sum of `focus_secs` over the current window; fully recomputed on
    /// every merge, never incrementally adjusted
    pub total_focus_secs: i64,
    /// Focus hours over the 7 most recent calendar days of the window
    pub last_week_focus_hours: f64,
    /// Timestamp of the most recent merge
    pub last_updated: DateTime<Utc>,
    /// Storage revision for conditional writes; 0 means never persisted
    #[serde(default)]
    pub revision: i64,
}

impl UserMetrics {
    /// Empty metrics for a user with no recorded activity.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            daily_focus: Vec::new(),
            total_focus_secs: 0,
            last_week_focus_hours: 0.0,
            last_updated: Utc::now(),
            revision: 0,
        }
    }

    /// The most recent bucket by date, if any.
    pub fn last_day(&self) -> Option<&DailyFocusBucket> {
        self.daily_focus.last()
    }
}
