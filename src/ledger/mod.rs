//! XP ledger module
//!
//! The accounting core of the reading program: an append-only per-student
//! XP history, a denormalized aggregate for fast reads, once-only weekly
//! badge issuance, and operator-triggered reconciliation.
//!
//! # Architecture
//!
//! ```text
//! session end     badge unlock     admin tools
//!      │               │               │
//!      └───────────────┼───────────────┘
//!                      ▼
//!                  XpAwarder ──── one transaction ────▶ xp_history (append)
//!                      │                               student_xp (CAS)
//!                      │                               badge_claims (set once)
//!                      ▼
//!              ~/.readquest/ledger.db
//!                      ▲
//!        Reconciler / AuditReporter (reads + compensating append)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let ledger = XpLedger::open(&path)?;
//!
//! // Award XP for a finished session
//! let receipt = ledger.award_xp(&AwardRequest::new(student, 30, XpKind::Reading))?;
//!
//! // Audit a student
//! let report = ledger.audit_report(&student, &sources, 20)?;
//! ```

mod audit;
mod award;
mod db;
mod queries;
mod reconcile;
mod sources;

pub use audit::{AuditReport, AuditReporter};
pub use award::{
    AwardError, AwardReceipt, AwardRequest, LevelUp, XpAwarder, DEFAULT_RETRY_BUDGET,
};
pub use db::LedgerDb;
pub use queries::{ChainViolation, LedgerQuery};
pub use reconcile::{
    ReconcileError, ReconcileOutcome, Reconciler, SourceBreakdown, ValidationReport, XpRates,
};
pub use sources::{EngagementSources, FactsFile, FixtureSources, JsonSources, SourceError};

use std::path::Path;

use anyhow::Result;

use crate::badges::{evaluator, BadgeDefinition};
use crate::config::LedgerConfig;
use crate::domain::{StudentId, StudentXp, WeekFacts, XpEntry};

/// Central facade over the ledger database.
///
/// Cheap to clone; all handles share one connection.
#[derive(Clone)]
pub struct XpLedger {
    db: LedgerDb,
    awarder: XpAwarder,
    reconciler: Reconciler,
    auditor: AuditReporter,
    query: LedgerQuery,
}

impl XpLedger {
    /// Open the ledger at a specific path with default rates.
    pub fn open(path: &Path) -> Result<Self> {
        Self::assemble(LedgerDb::open(path)?, XpRates::default(), DEFAULT_RETRY_BUDGET)
    }

    /// Open the ledger at the default location (`~/.readquest/ledger.db`).
    pub fn open_default() -> Result<Self> {
        Self::assemble(LedgerDb::open_default()?, XpRates::default(), DEFAULT_RETRY_BUDGET)
    }

    /// Open the ledger described by a configuration file.
    pub fn with_config(config: &LedgerConfig) -> Result<Self> {
        Self::assemble(
            LedgerDb::open(&config.db_path())?,
            config.rates(),
            config.award_retry_budget,
        )
    }

    fn assemble(db: LedgerDb, rates: XpRates, retry_budget: u32) -> Result<Self> {
        let awarder = XpAwarder::with_retry_budget(db.clone(), retry_budget);
        let reconciler = Reconciler::new(db.clone(), awarder.clone(), rates);
        let auditor = AuditReporter::new(db.clone(), reconciler.clone());
        let query = LedgerQuery::new(db.clone());
        Ok(Self {
            db,
            awarder,
            reconciler,
            auditor,
            query,
        })
    }

    /// Apply one XP award. See [`XpAwarder::award`].
    pub fn award_xp(&self, request: &AwardRequest) -> Result<AwardReceipt, AwardError> {
        self.awarder.award(request)
    }

    /// Evaluate the badge for a season week against the supplied facts and
    /// award it when earned. Returns `None` when the week has no badge
    /// (week 0 included) or the condition does not hold; a receipt with
    /// `duplicate: true` when the badge was already claimed.
    pub fn check_week_badge(
        &self,
        student: &StudentId,
        week: u8,
        facts: &WeekFacts,
    ) -> Result<Option<AwardReceipt>, AwardError> {
        let Some(badge) = BadgeDefinition::for_week(week) else {
            return Ok(None);
        };
        if !evaluator::evaluate(badge, facts) {
            return Ok(None);
        }
        self.award_xp(&AwardRequest::badge(student.clone(), badge))
            .map(Some)
    }

    /// Aggregate projection for a student (zeroed if unknown).
    pub fn student(&self, student: &StudentId) -> Result<StudentXp> {
        self.query.student_xp(student)
    }

    /// History tail, most recent first.
    pub fn history(&self, student: &StudentId, limit: usize) -> Result<Vec<XpEntry>> {
        self.query.history(student, limit)
    }

    /// Season weeks with a claimed badge.
    pub fn claimed_weeks(&self, student: &StudentId) -> Result<Vec<u8>> {
        self.query.claimed_weeks(student)
    }

    /// Read-only validation of the stored total against independent sources
    /// and the ledger sum.
    pub fn validate_total_xp(
        &self,
        student: &StudentId,
        sources: &dyn EngagementSources,
    ) -> Result<ValidationReport> {
        self.reconciler.validate(student, sources)
    }

    /// Operator-triggered correction of the stored total. See
    /// [`Reconciler::reconcile`].
    pub fn reconcile_xp(
        &self,
        student: &StudentId,
        sources: &dyn EngagementSources,
        use_history_as_truth: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        self.reconciler.reconcile(student, sources, use_history_as_truth)
    }

    /// Read-only audit report for operators.
    pub fn audit_report(
        &self,
        student: &StudentId,
        sources: &dyn EngagementSources,
        history_limit: usize,
    ) -> Result<AuditReport> {
        self.auditor.report(student, sources, history_limit)
    }

    /// Wipe one student's ledger, claims, and aggregate (operator tool).
    pub fn reset_student(&self, student: &StudentId) -> Result<()> {
        self.db.reset_student(student)
    }
}
