//! Ledger read queries
//!
//! Read-only access to the history, claims, and aggregate tables.

use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::domain::{StudentId, StudentXp, XpEntry, XpKind};

use super::db::LedgerDb;

/// A break in the history chain: an entry whose `previous_total` does not
/// match the `new_total` of the entry before it.
#[derive(Debug, Clone)]
pub struct ChainViolation {
    pub entry_id: i64,
    pub expected_previous: i64,
    pub found_previous: i64,
}

/// Query interface for the ledger.
#[derive(Clone)]
pub struct LedgerQuery {
    db: LedgerDb,
}

impl LedgerQuery {
    pub fn new(db: LedgerDb) -> Self {
        Self { db }
    }

    /// Aggregate projection for a student; zeroed if the student has no row.
    pub fn student_xp(&self, student: &StudentId) -> Result<StudentXp> {
        let conn = self.db.conn();
        let row = conn
            .query_row(
                "SELECT total_xp, weekly_xp, level, last_xp_update FROM student_xp WHERE student_id = ?1",
                [student.as_str()],
                |r| {
                    Ok(StudentXp {
                        student_id: student.clone(),
                        total_xp: r.get(0)?,
                        weekly_xp: r.get(1)?,
                        level: r.get(2)?,
                        last_xp_update: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row.unwrap_or_else(|| StudentXp::empty(student.clone())))
    }

    /// History tail, most recent first.
    pub fn history(&self, student: &StudentId, limit: usize) -> Result<Vec<XpEntry>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT id, student_id, kind, amount, previous_total, new_total,
                      badge_week, description, source, by_admin, created_at
               FROM xp_history WHERE student_id = ?1 ORDER BY id DESC LIMIT ?2"#,
        )?;
        let rows = stmt.query_map(params![student.as_str(), limit], entry_from_row)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Sum of all history amounts for a student.
    pub fn ledger_total(&self, student: &StudentId) -> Result<i64> {
        let conn = self.db.conn();
        let total = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM xp_history WHERE student_id = ?1",
            [student.as_str()],
            |r| r.get(0),
        )?;
        Ok(total)
    }

    /// Number of history entries for a student.
    pub fn entry_count(&self, student: &StudentId) -> Result<u64> {
        let conn = self.db.conn();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM xp_history WHERE student_id = ?1",
            [student.as_str()],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Season weeks with a badge claim, ascending.
    pub fn claimed_weeks(&self, student: &StudentId) -> Result<Vec<u8>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT week FROM badge_claims WHERE student_id = ?1 ORDER BY week",
        )?;
        let rows = stmt.query_map([student.as_str()], |r| r.get(0))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Claimed weeks whose granting ledger entry is missing. A non-empty
    /// result means the claim table and the history disagree.
    pub fn claims_without_entries(&self, student: &StudentId) -> Result<Vec<u8>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            r#"SELECT c.week FROM badge_claims c
               LEFT JOIN xp_history h ON h.id = c.entry_id
               WHERE c.student_id = ?1 AND (c.entry_id IS NULL OR h.id IS NULL)
               ORDER BY c.week"#,
        )?;
        let rows = stmt.query_map([student.as_str()], |r| r.get(0))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Walk the full history in insertion order and report every broken link
    /// in the `previous_total`/`new_total` chain.
    pub fn chain_violations(&self, student: &StudentId) -> Result<Vec<ChainViolation>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, previous_total, new_total FROM xp_history WHERE student_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([student.as_str()], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?, r.get::<_, i64>(2)?))
        })?;

        let mut violations = Vec::new();
        let mut expected: Option<i64> = None;
        for row in rows {
            let (id, previous, new) = row?;
            if let Some(expected) = expected {
                if previous != expected {
                    violations.push(ChainViolation {
                        entry_id: id,
                        expected_previous: expected,
                        found_previous: previous,
                    });
                }
            }
            expected = Some(new);
        }
        Ok(violations)
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<XpEntry> {
    let kind: String = row.get(2)?;
    Ok(XpEntry {
        id: row.get(0)?,
        student_id: StudentId::new(row.get::<_, String>(1)?),
        kind: XpKind::parse(&kind).unwrap_or(XpKind::ManualAdjustment),
        amount: row.get(3)?,
        previous_total: row.get(4)?,
        new_total: row.get(5)?,
        badge_week: row.get(6)?,
        description: row.get(7)?,
        source: row.get(8)?,
        by_admin: row.get::<_, i32>(9)? != 0,
        created_at: row.get(10)?,
    })
}
