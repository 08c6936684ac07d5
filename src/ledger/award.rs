//! Award engine - the only writer of ledger entries
//!
//! Every award runs as one IMMEDIATE transaction: read the aggregate, append
//! the history entry with before/after snapshots, set the badge claim, and
//! compare-and-set the aggregate row. A missed compare-and-set retries from
//! the read, so an amount is always applied to the latest committed total.

use chrono::Utc;
use rusqlite::{params, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::badges::{levels, BadgeDefinition};
use crate::domain::{StudentId, XpKind, XpMetadata};

use super::db::LedgerDb;

/// Default number of attempts before a write conflict becomes fatal.
pub const DEFAULT_RETRY_BUDGET: u32 = 5;

const WEEK_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// A single XP grant (or manual adjustment) to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardRequest {
    pub student: StudentId,
    /// Signed amount; negative only for manual adjustments.
    pub amount: i64,
    pub kind: XpKind,
    /// Season week, required for (and only for) badge awards.
    pub badge_week: Option<u8>,
    pub metadata: XpMetadata,
}

impl AwardRequest {
    pub fn new(student: StudentId, amount: i64, kind: XpKind) -> Self {
        Self {
            student,
            amount,
            kind,
            badge_week: None,
            metadata: XpMetadata::default(),
        }
    }

    pub fn badge(student: StudentId, badge: &BadgeDefinition) -> Self {
        Self {
            student,
            amount: badge.xp,
            kind: XpKind::Badge,
            badge_week: Some(badge.week),
            metadata: XpMetadata {
                description: badge.name.to_string(),
                source: Some("badge-calendar".to_string()),
                by_admin: false,
            },
        }
    }

    pub fn with_metadata(mut self, metadata: XpMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A level-up detected while applying an award.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub new_title: String,
}

/// Outcome of a successful award call.
///
/// `duplicate` marks the idempotent no-op case: the badge week was already
/// claimed, nothing was written, and the totals are unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardReceipt {
    pub previous_total: i64,
    pub new_total: i64,
    pub duplicate: bool,
    /// Rowid of the appended history entry; `None` for duplicates.
    pub entry_id: Option<i64>,
    pub level_up: Option<LevelUp>,
}

/// Why an award was refused. Everything except `Contention` is terminal and
/// reported without retry; a duplicate badge is not an error (see
/// [`AwardReceipt::duplicate`]).
#[derive(Debug, thiserror::Error)]
pub enum AwardError {
    #[error("XP amount must not be zero")]
    ZeroAmount,

    #[error("{kind} awards cannot be negative")]
    NegativeAmount { kind: XpKind },

    #[error("adjustment of {amount} would drop {student} below zero (current total {current})")]
    Underflow {
        student: StudentId,
        current: i64,
        amount: i64,
    },

    #[error("badge awards must name a season week")]
    MissingBadgeWeek,

    #[error("{kind} awards cannot carry a badge week")]
    UnexpectedBadgeWeek { kind: XpKind },

    #[error("week {0} is not in the badge calendar")]
    UnknownBadgeWeek(u8),

    #[error("gave up on {student} after {attempts} conflicting writes")]
    Contention { student: StudentId, attempts: u32 },

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

enum Attempt {
    Committed(AwardReceipt),
    Conflict,
}

/// Applies XP awards to the ledger and aggregate.
#[derive(Clone)]
pub struct XpAwarder {
    db: LedgerDb,
    retry_budget: u32,
}

impl XpAwarder {
    pub fn new(db: LedgerDb) -> Self {
        Self::with_retry_budget(db, DEFAULT_RETRY_BUDGET)
    }

    pub fn with_retry_budget(db: LedgerDb, retry_budget: u32) -> Self {
        Self {
            db,
            retry_budget: retry_budget.max(1),
        }
    }

    /// Apply one award. Retries transparently on write conflicts, up to the
    /// configured budget; the caller sees either a committed receipt or an
    /// error with the aggregate untouched.
    pub fn award(&self, request: &AwardRequest) -> Result<AwardReceipt, AwardError> {
        Self::validate(request)?;

        for attempt in 1..=self.retry_budget {
            match self.try_award(request)? {
                Attempt::Committed(receipt) => {
                    if receipt.duplicate {
                        debug!(
                            student = %request.student,
                            week = request.badge_week.unwrap_or(0),
                            "badge already claimed, award skipped"
                        );
                    } else {
                        debug!(
                            student = %request.student,
                            kind = %request.kind,
                            amount = request.amount,
                            total = receipt.new_total,
                            "xp awarded"
                        );
                    }
                    return Ok(receipt);
                }
                Attempt::Conflict => {
                    warn!(
                        student = %request.student,
                        attempt,
                        "aggregate changed under us, retrying award"
                    );
                }
            }
        }

        Err(AwardError::Contention {
            student: request.student.clone(),
            attempts: self.retry_budget,
        })
    }

    fn validate(request: &AwardRequest) -> Result<(), AwardError> {
        if request.amount == 0 {
            return Err(AwardError::ZeroAmount);
        }
        if request.amount < 0 && !request.kind.allows_negative() {
            return Err(AwardError::NegativeAmount { kind: request.kind });
        }
        match (request.kind, request.badge_week) {
            (XpKind::Badge, None) => return Err(AwardError::MissingBadgeWeek),
            (XpKind::Badge, Some(week)) => {
                if BadgeDefinition::for_week(week).is_none() {
                    return Err(AwardError::UnknownBadgeWeek(week));
                }
            }
            (kind, Some(_)) => return Err(AwardError::UnexpectedBadgeWeek { kind }),
            (_, None) => {}
        }
        Ok(())
    }

    /// One read-modify-write cycle. Rolls back on any error and on the
    /// duplicate-badge short circuit; commits only when the compare-and-set
    /// on the aggregate row matched the snapshot we read.
    fn try_award(&self, request: &AwardRequest) -> Result<Attempt, AwardError> {
        let now = Utc::now().timestamp_millis();
        let student = request.student.as_str();

        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // The aggregate row is created lazily at zero on first touch.
        tx.execute(
            "INSERT OR IGNORE INTO student_xp (student_id) VALUES (?1)",
            [student],
        )?;
        let (total, version): (i64, i64) = tx.query_row(
            "SELECT total_xp, version FROM student_xp WHERE student_id = ?1",
            [student],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        if let Some(week) = request.badge_week {
            let claimed = tx.execute(
                "INSERT OR IGNORE INTO badge_claims (student_id, week, claimed_at) VALUES (?1, ?2, ?3)",
                params![student, week, now],
            )?;
            if claimed == 0 {
                // Already earned this week: idempotent no-op, nothing written.
                return Ok(Attempt::Committed(AwardReceipt {
                    previous_total: total,
                    new_total: total,
                    duplicate: true,
                    entry_id: None,
                    level_up: None,
                }));
            }
        }

        let new_total = total + request.amount;
        if new_total < 0 {
            return Err(AwardError::Underflow {
                student: request.student.clone(),
                current: total,
                amount: request.amount,
            });
        }

        tx.execute(
            r#"INSERT INTO xp_history
               (student_id, kind, amount, previous_total, new_total, badge_week,
                description, source, by_admin, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            params![
                student,
                request.kind.as_str(),
                request.amount,
                total,
                new_total,
                request.badge_week,
                request.metadata.description,
                request.metadata.source,
                request.metadata.by_admin as i32,
                now,
            ],
        )?;
        let entry_id = tx.last_insert_rowid();

        if let Some(week) = request.badge_week {
            tx.execute(
                "UPDATE badge_claims SET entry_id = ?1 WHERE student_id = ?2 AND week = ?3",
                params![entry_id, student, week],
            )?;
        }

        let weekly: i64 = tx.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM xp_history WHERE student_id = ?1 AND created_at >= ?2",
            params![student, now - WEEK_WINDOW_MS],
            |r| r.get(0),
        )?;

        let old_level = levels::level_of(total);
        let new_level = levels::level_of(new_total);

        let updated = tx.execute(
            r#"UPDATE student_xp
               SET total_xp = ?1, weekly_xp = ?2, level = ?3, last_xp_update = ?4,
                   version = version + 1
               WHERE student_id = ?5 AND version = ?6"#,
            params![new_total, weekly, new_level, now, student, version],
        )?;
        if updated == 0 {
            // Someone else committed since our read; dropping the
            // transaction rolls the append back too.
            return Ok(Attempt::Conflict);
        }

        tx.commit()?;

        let level_up = (new_level > old_level).then(|| LevelUp {
            old_level,
            new_level,
            new_title: levels::title_for(new_level).to_string(),
        });

        Ok(Attempt::Committed(AwardReceipt {
            previous_total: total,
            new_total,
            duplicate: false,
            entry_id: Some(entry_id),
            level_up,
        }))
    }
}
