//! Optimization feedback selection
//!
//! Maps a metrics snapshot to a static advisory message via an ordered
//! threshold ladder. This is a fixed decision table, not a learned model;
//! the [`FeedbackPolicy`] trait is the seam where a real scoring model
//! could be swapped in later, as long as it keeps producing the same
//! area/feedback/action triple.

use crate::types::UserMetrics;

/// Focus improvement areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackArea {
    /// No data yet, advise the user to start recording
    DataCollection,
    /// High total focus time, watch for burnout
    WorkLifeBalance,
    /// Short focus sessions on the most recent day
    MorningFocus,
    /// Decent daily focus, push for regularity
    Consistency,
}

impl FeedbackArea {
    /// Display name used by dashboard clients.
    pub fn name(&self) -> &'static str {
        match self {
            FeedbackArea::DataCollection => "Data Collection",
            FeedbackArea::WorkLifeBalance => "Work-Life Balance",
            FeedbackArea::MorningFocus => "Morning Focus",
            FeedbackArea::Consistency => "Consistency",
        }
    }
}

/// A selected advisory: message, area, and suggested next action.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Advisory {
    pub feedback: String,
    pub area: &'static str,
    pub action: &'static str,
}

/// Policy seam for advisory selection.
///
/// Implementations must be pure: same metrics in, same advisory out.
pub trait FeedbackPolicy {
    fn select(&self, metrics: Option<&UserMetrics>) -> Advisory;
}

/// The built-in threshold ladder.
///
/// Rules are evaluated in order, first match wins:
/// 1. total focus > 5 hours
/// 2. last-day focus < 2 hours
/// 3. everything else
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdPolicy;

impl ThresholdPolicy {
    const ACTION: &'static str = "Apply feedback immediately.";

    fn area_of(total_hours: f64, last_day_hours: f64) -> FeedbackArea {
        if total_hours > 5.0 {
            FeedbackArea::WorkLifeBalance
        } else if last_day_hours < 2.0 {
            FeedbackArea::MorningFocus
        } else {
            FeedbackArea::Consistency
        }
    }
}

impl FeedbackPolicy for ThresholdPolicy {
    fn select(&self, metrics: Option<&UserMetrics>) -> Advisory {
        let metrics = match metrics {
            Some(m) if !m.daily_focus.is_empty() => m,
            _ => {
                return Advisory {
                    feedback: "Start tracking your focus sessions to unlock personalized \
                               optimization feedback!"
                        .to_string(),
                    area: FeedbackArea::DataCollection.name(),
                    action: "Record 5 sessions this week.",
                }
            }
        };

        let total_hours = metrics.total_focus_secs as f64 / 3600.0;
        let last_day_hours = metrics
            .last_day()
            .map(|b| b.focus_secs as f64 / 3600.0)
            .unwrap_or(0.0);

        let area = Self::area_of(total_hours, last_day_hours);
        let feedback = match area {
            FeedbackArea::WorkLifeBalance => format!(
                "Your total focus time this month ({:.1} hours) is excellent! However, we \
                 notice your activity often extends past 8 PM. Try using the Pomodoro \
                 technique to wrap up tasks before dinner to prevent burnout.",
                total_hours
            ),
            FeedbackArea::MorningFocus => format!(
                "Your focus sessions today were short ({:.1} hours). Try scheduling a single \
                 90-minute deep work block first thing in the morning to maximize your \
                 high-energy hours.",
                last_day_hours
            ),
            FeedbackArea::Consistency => format!(
                "You're making great progress! Your daily focus time averages {:.1} hours. \
                 The next step is consistency: aim for at least 3 high-focus blocks every \
                 day this week.",
                last_day_hours
            ),
            FeedbackArea::DataCollection => unreachable!("handled above"),
        };

        Advisory {
            feedback,
            area: area.name(),
            action: Self::ACTION,
        }
    }
}
