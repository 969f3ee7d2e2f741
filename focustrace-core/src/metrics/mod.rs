//! Metrics layer for focustrace
//!
//! Maintains the per-user rolling window of daily focus summaries:
//! - [`window`]: pure merge/recompute over the bucket window
//! - [`aggregator`]: load-merge-store with conflict retry

pub mod aggregator;
pub mod window;

pub use aggregator::{MetricsAggregator, DEFAULT_MERGE_RETRIES};
