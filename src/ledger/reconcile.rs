//! Reconciliation engine
//!
//! Recomputes a student's canonical XP from independent sources (reading
//! minutes, claimed badges, family battles, voting) and compares it with the
//! stored aggregate and the ledger sum. `validate` only reads; `reconcile`
//! corrects drift by appending a single compensating manual adjustment
//! through the award engine, never by overwriting the aggregate in place.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::badges::BadgeDefinition;
use crate::domain::{StudentId, XpKind, XpMetadata};

use super::award::{AwardError, AwardRequest, XpAwarder};
use super::db::LedgerDb;
use super::queries::LedgerQuery;
use super::sources::EngagementSources;

/// XP conversion rates applied to raw source facts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct XpRates {
    /// XP granted per completed reading minute.
    pub reading_xp_per_minute: i64,
    /// XP granted once for casting the yearly vote.
    pub voting_xp: i64,
}

impl Default for XpRates {
    fn default() -> Self {
        Self {
            reading_xp_per_minute: 1,
            voting_xp: 50,
        }
    }
}

/// Per-source XP contributions. `None` means the store could not be read and
/// the contribution is unknown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub reading: Option<i64>,
    /// Always known: the claims table is ours.
    pub badges: i64,
    pub family_battle: Option<i64>,
    pub voting: Option<i64>,
}

impl SourceBreakdown {
    /// Sum of the contributions that could be read.
    pub fn known_total(&self) -> i64 {
        self.badges
            + self.reading.unwrap_or(0)
            + self.family_battle.unwrap_or(0)
            + self.voting.unwrap_or(0)
    }

    pub fn complete(&self) -> bool {
        self.reading.is_some() && self.family_battle.is_some() && self.voting.is_some()
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.reading.is_none() {
            missing.push("reading-session");
        }
        if self.family_battle.is_none() {
            missing.push("family-battle");
        }
        if self.voting.is_none() {
            missing.push("voting");
        }
        missing
    }
}

/// Result of a validation pass. Never mutates anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub student: StudentId,
    pub stored_total: i64,
    /// Sum of all ledger amounts, computed independently of the aggregate.
    pub ledger_total: i64,
    /// Source-derived total over the contributions that could be read.
    pub calculated_total: i64,
    /// False when a source was unavailable and `calculated_total` is partial.
    pub complete: bool,
    /// `stored_total - calculated_total`.
    pub difference: i64,
    pub is_valid: bool,
    pub sources: SourceBreakdown,
    pub discrepancies: Vec<String>,
}

/// Result of a reconciliation correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub student: StudentId,
    pub previous_total: i64,
    pub new_total: i64,
    /// Amount of the appended adjustment; zero when nothing needed fixing.
    pub difference: i64,
    pub entry_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("cannot reconcile {student} from incomplete sources (unavailable: {missing})")]
    IncompleteSources { student: StudentId, missing: String },

    #[error(transparent)]
    Award(#[from] AwardError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Audits and repairs student XP totals.
#[derive(Clone)]
pub struct Reconciler {
    query: LedgerQuery,
    awarder: XpAwarder,
    rates: XpRates,
}

impl Reconciler {
    pub fn new(db: LedgerDb, awarder: XpAwarder, rates: XpRates) -> Self {
        Self {
            query: LedgerQuery::new(db),
            awarder,
            rates,
        }
    }

    /// Compute the canonical total two ways (independent sources and the
    /// ledger sum) and report every discrepancy found. Read-only; a source
    /// that cannot be read degrades the report rather than failing it.
    pub fn validate(
        &self,
        student: &StudentId,
        sources: &dyn EngagementSources,
    ) -> anyhow::Result<ValidationReport> {
        let aggregate = self.query.student_xp(student)?;
        let ledger_total = self.query.ledger_total(student)?;

        let mut discrepancies = Vec::new();

        let claimed = self.query.claimed_weeks(student)?;
        let badge_xp: i64 = claimed
            .iter()
            .filter_map(|&week| BadgeDefinition::for_week(week))
            .map(|badge| badge.xp)
            .sum();

        let reading = match sources.reading_minutes(student) {
            Ok(minutes) => Some(minutes as i64 * self.rates.reading_xp_per_minute),
            Err(err) => {
                discrepancies.push(format!("reading XP unknown: {err}"));
                None
            }
        };
        let family_battle = match sources.family_battle_xp(student) {
            Ok(xp) => Some(xp),
            Err(err) => {
                discrepancies.push(format!("family-battle XP unknown: {err}"));
                None
            }
        };
        let voting = match sources.has_voted(student) {
            Ok(true) => Some(self.rates.voting_xp),
            Ok(false) => Some(0),
            Err(err) => {
                discrepancies.push(format!("voting XP unknown: {err}"));
                None
            }
        };

        let breakdown = SourceBreakdown {
            reading,
            badges: badge_xp,
            family_battle,
            voting,
        };
        let calculated_total = breakdown.known_total();
        let complete = breakdown.complete();
        let difference = aggregate.total_xp - calculated_total;

        if aggregate.total_xp != ledger_total {
            discrepancies.push(format!(
                "stored total {} does not match history sum {}",
                aggregate.total_xp, ledger_total
            ));
        }
        for violation in self.query.chain_violations(student)? {
            discrepancies.push(format!(
                "history chain broken at entry {}: previous_total {} but prior entry ended at {}",
                violation.entry_id, violation.found_previous, violation.expected_previous
            ));
        }
        for week in self.query.claims_without_entries(student)? {
            discrepancies.push(format!(
                "badge week {week} claimed without a matching history entry"
            ));
        }
        if complete && difference != 0 {
            discrepancies.push(format!(
                "stored total {} differs from source-derived total {} by {}",
                aggregate.total_xp, calculated_total, difference
            ));
        }

        let is_valid = complete && discrepancies.is_empty();
        if !is_valid {
            warn!(
                student = %student,
                stored = aggregate.total_xp,
                calculated = calculated_total,
                complete,
                "validation found discrepancies"
            );
        }

        Ok(ValidationReport {
            student: student.clone(),
            stored_total: aggregate.total_xp,
            ledger_total,
            calculated_total,
            complete,
            difference,
            is_valid,
            sources: breakdown,
            discrepancies,
        })
    }

    /// Correct the aggregate to the canonical total by appending exactly one
    /// compensating manual adjustment. Operator-triggered only; a zero
    /// difference appends nothing.
    pub fn reconcile(
        &self,
        student: &StudentId,
        sources: &dyn EngagementSources,
        use_history_as_truth: bool,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let report = self.validate(student, sources)?;

        let (target, basis) = if use_history_as_truth {
            (report.ledger_total, "history sum")
        } else {
            if !report.complete {
                return Err(ReconcileError::IncompleteSources {
                    student: student.clone(),
                    missing: report.sources.missing().join(", "),
                });
            }
            (report.calculated_total, "independent sources")
        };

        let delta = target - report.stored_total;
        if delta == 0 {
            info!(student = %student, total = target, "reconciliation found nothing to correct");
            return Ok(ReconcileOutcome {
                student: student.clone(),
                previous_total: report.stored_total,
                new_total: report.stored_total,
                difference: 0,
                entry_id: None,
            });
        }

        let request = AwardRequest::new(student.clone(), delta, XpKind::ManualAdjustment)
            .with_metadata(XpMetadata {
                description: format!("reconciliation against {basis}"),
                source: Some("reconciliation".to_string()),
                by_admin: true,
            });
        let receipt = self.awarder.award(&request)?;

        info!(
            student = %student,
            previous = receipt.previous_total,
            corrected = receipt.new_total,
            delta,
            basis,
            "reconciliation adjustment applied"
        );

        Ok(ReconcileOutcome {
            student: student.clone(),
            previous_total: receipt.previous_total,
            new_total: receipt.new_total,
            difference: delta,
            entry_id: receipt.entry_id,
        })
    }
}
