//! Audit reporting
//!
//! Composes the aggregate, level progression, claimed badges, validation
//! result, and recent history into a single read-only report for operators.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::badges::{levels, LevelProgress};
use crate::domain::{StudentId, StudentXp, XpEntry};

use super::db::LedgerDb;
use super::queries::LedgerQuery;
use super::reconcile::{Reconciler, ValidationReport};
use super::sources::EngagementSources;

/// Everything an operator needs to see about one student's XP state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub student: StudentId,
    pub total_xp: i64,
    pub weekly_xp: i64,
    pub level: u32,
    pub progress: LevelProgress,
    pub claimed_weeks: Vec<u8>,
    /// Mirrors `validation.difference != 0` without running a correction.
    pub has_discrepancy: bool,
    pub validation: ValidationReport,
    pub recent_history: Vec<XpEntry>,
}

/// Builds audit reports. Never mutates state.
#[derive(Clone)]
pub struct AuditReporter {
    query: LedgerQuery,
    reconciler: Reconciler,
}

impl AuditReporter {
    pub fn new(db: LedgerDb, reconciler: Reconciler) -> Self {
        Self {
            query: LedgerQuery::new(db),
            reconciler,
        }
    }

    pub fn report(
        &self,
        student: &StudentId,
        sources: &dyn EngagementSources,
        history_limit: usize,
    ) -> Result<AuditReport> {
        let aggregate: StudentXp = self.query.student_xp(student)?;
        let validation = self.reconciler.validate(student, sources)?;
        let recent_history = self.query.history(student, history_limit)?;
        let claimed_weeks = self.query.claimed_weeks(student)?;

        Ok(AuditReport {
            student: student.clone(),
            total_xp: aggregate.total_xp,
            weekly_xp: aggregate.weekly_xp,
            level: aggregate.level.max(1),
            progress: levels::progress(aggregate.total_xp),
            claimed_weeks,
            has_discrepancy: validation.difference != 0,
            validation,
            recent_history,
        })
    }
}
