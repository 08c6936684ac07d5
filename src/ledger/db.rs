//! SQLite storage for the XP ledger
//!
//! Manages the `~/.readquest/ledger.db` database with automatic schema
//! migration. One aggregate row per student, an unbounded append-only
//! history table, and a claims table guarding once-only badge issuance.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config;
use crate::domain::StudentId;

/// Database wrapper shared by the award, query, and reconciliation sides.
#[derive(Clone)]
pub struct LedgerDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl LedgerDb {
    /// Open or create the ledger database at the default location
    /// (`~/.readquest/ledger.db`).
    pub fn open_default() -> Result<Self> {
        let db_path = config::data_dir().join("ledger.db");
        Self::open(&db_path)
    }

    /// Open or create the ledger database at a specific path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create ledger dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open ledger db: {}", path.display()))?;

        // WAL so a second process (e.g. the sync worker) can share the file
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Get a reference to the connection (for queries and transactions).
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("Ledger DB lock poisoned")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    /// Run any pending migrations.
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: claims table replaces the per-week boolean columns
        if version < 2 {
            let has_flags: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('student_xp') WHERE name = 'badge_weeks'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if has_flags {
                // Old installs stored claimed weeks as a comma list on the
                // aggregate row; move them into badge_claims.
                conn.execute_batch(
                    r#"
                    INSERT OR IGNORE INTO badge_claims (student_id, week, claimed_at)
                    SELECT s.student_id, CAST(w.value AS INTEGER), 0
                    FROM student_xp s, json_each('[' || s.badge_weeks || ']') w
                    WHERE s.badge_weeks <> '';
                    ALTER TABLE student_xp DROP COLUMN badge_weeks;
                    "#,
                )?;
            }

            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// Delete one student's ledger, claims, and aggregate (operator tool).
    pub fn reset_student(&self, student: &StudentId) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM xp_history WHERE student_id = ?1", [student.as_str()])?;
        conn.execute("DELETE FROM badge_claims WHERE student_id = ?1", [student.as_str()])?;
        conn.execute("DELETE FROM student_xp WHERE student_id = ?1", [student.as_str()])?;
        Ok(())
    }
}

/// SQL schema for the ledger database
const SCHEMA_SQL: &str = r#"
-- Aggregate projection (one row per student)
CREATE TABLE IF NOT EXISTS student_xp (
    student_id TEXT PRIMARY KEY,
    total_xp INTEGER NOT NULL DEFAULT 0,
    weekly_xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    last_xp_update INTEGER,
    -- optimistic-concurrency counter; bumped by every aggregate write
    version INTEGER NOT NULL DEFAULT 0
);

-- Append-only XP history (never updated or deleted)
CREATE TABLE IF NOT EXISTS xp_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    amount INTEGER NOT NULL,
    previous_total INTEGER NOT NULL,
    new_total INTEGER NOT NULL,
    badge_week INTEGER,
    description TEXT NOT NULL DEFAULT '',
    source TEXT,
    by_admin INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_history_student ON xp_history(student_id, id);
CREATE INDEX IF NOT EXISTS idx_history_created ON xp_history(student_id, created_at);

-- Once-only badge issuance guard, checked-and-set inside the award transaction
CREATE TABLE IF NOT EXISTS badge_claims (
    student_id TEXT NOT NULL,
    week INTEGER NOT NULL,
    entry_id INTEGER,
    claimed_at INTEGER NOT NULL,
    PRIMARY KEY (student_id, week)
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_init() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test_ledger.db");
        let db = LedgerDb::open(&db_path).unwrap();

        let conn = db.conn();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"student_xp".to_string()));
        assert!(tables.contains(&"xp_history".to_string()));
        assert!(tables.contains(&"badge_claims".to_string()));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test_ledger.db");
        LedgerDb::open(&db_path).unwrap();
        // Second open must not fail on existing schema
        LedgerDb::open(&db_path).unwrap();
    }
}
