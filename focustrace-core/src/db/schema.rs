//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: activity events + derived per-user metrics
    r#"
    -- ============================================
    -- Raw activity events (append-only)
    -- ============================================

    CREATE TABLE IF NOT EXISTS activity_events (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id          TEXT NOT NULL,
        time_spent_secs  INTEGER NOT NULL,
        kind             TEXT NOT NULL,      -- 'focus_session', 'distraction', 'break', 'tab_switch'
        attributes       JSON NOT NULL,
        ts               DATETIME NOT NULL,
        created_at       DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_events_user ON activity_events(user_id);
    CREATE INDEX IF NOT EXISTS idx_events_user_ts ON activity_events(user_id, ts DESC);

    -- ============================================
    -- Derived per-user metrics (regenerable)
    -- ============================================

    CREATE TABLE IF NOT EXISTS user_metrics (
        user_id               TEXT PRIMARY KEY,
        daily_focus           JSON NOT NULL,  -- ordered array of daily buckets
        total_focus_secs      INTEGER NOT NULL,
        last_week_focus_hours REAL NOT NULL,
        last_updated          DATETIME NOT NULL,
        revision              INTEGER NOT NULL  -- compare-and-swap counter
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
