//! Database repository layer
//!
//! Query and insert operations for activity events and user metrics.

use crate::error::{Error, Result};
use crate::types::{ActivityEvent, ActivityKind, DailyFocusBucket, NewActivityEvent, UserMetrics};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrency between readers and the writer
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    // ============================================
    // Activity event operations
    // ============================================

    /// Append a new activity event. Validation happens before any write.
    ///
    /// Returns the stored event with its row id and resolved timestamps.
    pub fn insert_event(&self, new: &NewActivityEvent) -> Result<ActivityEvent> {
        new.validate()?;

        let now = Utc::now();
        let ts = new.ts.unwrap_or(now);

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO activity_events (user_id, time_spent_secs, kind, attributes, ts, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                new.user_id,
                new.time_spent_secs,
                new.kind.as_str(),
                new.attributes.to_string(),
                ts.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(ActivityEvent {
            id: conn.last_insert_rowid(),
            user_id: new.user_id.clone(),
            time_spent_secs: new.time_spent_secs,
            kind: new.kind,
            attributes: new.attributes.clone(),
            ts,
            created_at: now,
        })
    }

    /// Most recent events for a user, newest first.
    pub fn recent_events(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM activity_events WHERE user_id = ? ORDER BY ts DESC LIMIT ?",
        )?;
        let events = stmt
            .query_map(params![user_id, limit as i64], Self::row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// Total number of events stored for a user.
    pub fn event_count(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM activity_events WHERE user_id = ?",
            [user_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    fn row_to_event(row: &Row) -> rusqlite::Result<ActivityEvent> {
        let kind_str: String = row.get("kind")?;
        let attributes_str: String = row.get("attributes")?;
        let ts_str: String = row.get("ts")?;
        let created_str: String = row.get("created_at")?;

        Ok(ActivityEvent {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            time_spent_secs: row.get("time_spent_secs")?,
            kind: ActivityKind::from_str(&kind_str)
                .unwrap_or(ActivityKind::FocusSession),
            attributes: serde_json::from_str(&attributes_str).unwrap_or(serde_json::json!({})),
            ts: parse_ts(&ts_str),
            created_at: parse_ts(&created_str),
        })
    }

    // ============================================
    // User metrics operations
    // ============================================

    /// Load the metrics document for a user, if one exists.
    pub fn get_metrics(&self, user_id: &str) -> Result<Option<UserMetrics>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM user_metrics WHERE user_id = ?",
            [user_id],
            Self::row_to_metrics,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Conditionally store a metrics document.
    ///
    /// The caller passes the document with `revision` already bumped past
    /// the value it was loaded at. A fresh document (loaded revision 0)
    /// inserts only if no row exists; an existing document updates only if
    /// the stored revision still matches. Returns `false` when another
    /// writer got there first, in which case the caller should reload and
    /// re-merge.
    pub fn try_store_metrics(&self, metrics: &UserMetrics) -> Result<bool> {
        let daily_focus = serde_json::to_string(&metrics.daily_focus)?;
        let conn = self.conn.lock().unwrap();

        let changed = if metrics.revision == 1 {
            conn.execute(
                r#"
                INSERT INTO user_metrics
                    (user_id, daily_focus, total_focus_secs, last_week_focus_hours, last_updated, revision)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(user_id) DO NOTHING
                "#,
                params![
                    metrics.user_id,
                    daily_focus,
                    metrics.total_focus_secs,
                    metrics.last_week_focus_hours,
                    metrics.last_updated.to_rfc3339(),
                    metrics.revision,
                ],
            )?
        } else {
            conn.execute(
                r#"
                UPDATE user_metrics SET
                    daily_focus = ?2,
                    total_focus_secs = ?3,
                    last_week_focus_hours = ?4,
                    last_updated = ?5,
                    revision = ?6
                WHERE user_id = ?1 AND revision = ?7
                "#,
                params![
                    metrics.user_id,
                    daily_focus,
                    metrics.total_focus_secs,
                    metrics.last_week_focus_hours,
                    metrics.last_updated.to_rfc3339(),
                    metrics.revision,
                    metrics.revision - 1,
                ],
            )?
        };

        Ok(changed == 1)
    }

    fn row_to_metrics(row: &Row) -> rusqlite::Result<UserMetrics> {
        let daily_focus_str: String = row.get("daily_focus")?;
        let last_updated_str: String = row.get("last_updated")?;

        let daily_focus: Vec<DailyFocusBucket> =
            serde_json::from_str(&daily_focus_str).unwrap_or_default();

        Ok(UserMetrics {
            user_id: row.get("user_id")?,
            daily_focus,
            total_focus_secs: row.get("total_focus_secs")?,
            last_week_focus_hours: row.get("last_week_focus_hours")?,
            last_updated: parse_ts(&last_updated_str),
            revision: row.get("revision")?,
        })
    }
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn new_event(user_id: &str, secs: i64) -> NewActivityEvent {
        NewActivityEvent {
            user_id: user_id.to_string(),
            time_spent_secs: secs,
            kind: ActivityKind::FocusSession,
            attributes: serde_json::json!({"url": "https://example.com"}),
            ts: None,
        }
    }

    #[test]
    fn test_insert_and_fetch_event() {
        let db = test_db();
        let stored = db.insert_event(&new_event("u1", 300)).unwrap();
        assert!(stored.id > 0);

        let events = db.recent_events("u1", 20).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_spent_secs, 300);
        assert_eq!(events[0].kind, ActivityKind::FocusSession);
        assert_eq!(events[0].attributes["url"], "https://example.com");
    }

    #[test]
    fn test_insert_rejects_invalid_event() {
        let db = test_db();
        let err = db.insert_event(&new_event("u1", -1)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(db.event_count("u1").unwrap(), 0);
    }

    #[test]
    fn test_recent_events_ordering_and_limit() {
        let db = test_db();
        for i in 0..5 {
            let mut ev = new_event("u1", 100 + i);
            ev.ts = Some(Utc::now() + chrono::Duration::seconds(i));
            db.insert_event(&ev).unwrap();
        }
        let events = db.recent_events("u1", 3).unwrap();
        assert_eq!(events.len(), 3);
        // Newest first
        assert_eq!(events[0].time_spent_secs, 104);
    }

    #[test]
    fn test_metrics_absent_for_unknown_user() {
        let db = test_db();
        assert!(db.get_metrics("nobody").unwrap().is_none());
    }

    #[test]
    fn test_metrics_insert_and_roundtrip() {
        let db = test_db();
        let mut metrics = UserMetrics::empty("u1");
        crate::metrics::window::merge_default(&mut metrics, 900, Utc::now());
        metrics.revision = 1;

        assert!(db.try_store_metrics(&metrics).unwrap());

        let loaded = db.get_metrics("u1").unwrap().unwrap();
        assert_eq!(loaded.total_focus_secs, 900);
        assert_eq!(loaded.daily_focus.len(), 1);
        assert_eq!(loaded.revision, 1);
    }

    #[test]
    fn test_stale_revision_is_rejected() {
        let db = test_db();
        let mut metrics = UserMetrics::empty("u1");
        crate::metrics::window::merge_default(&mut metrics, 900, Utc::now());
        metrics.revision = 1;
        assert!(db.try_store_metrics(&metrics).unwrap());

        // A second writer that also loaded revision 0 loses the insert race
        let mut rival = UserMetrics::empty("u1");
        crate::metrics::window::merge_default(&mut rival, 500, Utc::now());
        rival.revision = 1;
        assert!(!db.try_store_metrics(&rival).unwrap());

        // And an update against a revision that moved on is rejected too
        let mut stale = db.get_metrics("u1").unwrap().unwrap();
        stale.revision += 1;
        assert!(db.try_store_metrics(&stale).unwrap());
        assert!(!db.try_store_metrics(&stale).unwrap());
    }
}
