//! # focustrace-core
//!
//! Core library for focustrace - a browser activity tracker.
//!
//! This library provides:
//! - Domain types for activity events and per-user focus metrics
//! - Database storage layer with SQLite
//! - Rolling-window metrics aggregation
//! - Threshold-based optimization feedback
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three stages:
//! - **Events:** raw activity events, append-only and immutable
//! - **Metrics:** a per-user rolling window of daily focus buckets,
//!   re-derived on every merge (regenerable)
//! - **Feedback:** a static advisory selected from the metrics snapshot
//!
//! ## Example
//!
//! ```rust,no_run
//! use focustrace_core::{ActivityRecorder, Config, Database};
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let recorder = ActivityRecorder::new(&db);
//! let advisory = recorder.feedback("user-1").expect("failed to select feedback");
//! println!("{}: {}", advisory.area, advisory.feedback);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use feedback::{Advisory, FeedbackPolicy, ThresholdPolicy};
pub use metrics::MetricsAggregator;
pub use recorder::{ActivityRecorder, RecordOutcome};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod logging;
pub mod metrics;
pub mod recorder;
pub mod types;
