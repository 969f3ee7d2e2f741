//! Database layer for focustrace
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for event and metrics access
//! - Conditional (revision-checked) metrics writes

pub mod repo;
pub mod schema;

pub use repo::Database;
