//! `validate`, `reconcile`, and `audit` commands

use std::path::Path;

use anyhow::{bail, Result};

use readquest::config::LedgerConfig;
use readquest::domain::StudentId;
use readquest::ledger::{JsonSources, ValidationReport, XpLedger};

pub fn validate_command(config: &LedgerConfig, student: &str, facts: &Path) -> Result<()> {
    let ledger = XpLedger::with_config(config)?;
    let sources = JsonSources::load(facts)?;
    let report = ledger.validate_total_xp(&StudentId::from(student), &sources)?;
    print_validation(&report);
    Ok(())
}

pub fn reconcile_command(
    config: &LedgerConfig,
    student: &str,
    facts: &Path,
    use_history: bool,
    yes: bool,
) -> Result<()> {
    let ledger = XpLedger::with_config(config)?;
    let sources = JsonSources::load(facts)?;
    let student = StudentId::from(student);

    let report = ledger.validate_total_xp(&student, &sources)?;
    print_validation(&report);

    if !yes {
        bail!(
            "reconcile appends a compensating adjustment and updates the stored total; \
             re-run with --yes to confirm"
        );
    }

    let outcome = ledger.reconcile_xp(&student, &sources, use_history)?;
    if outcome.difference == 0 {
        println!("Nothing to correct; total stays at {} XP.", outcome.new_total);
    } else {
        println!(
            "Applied {:+} XP adjustment: {} -> {} XP (entry #{})",
            outcome.difference,
            outcome.previous_total,
            outcome.new_total,
            outcome.entry_id.unwrap_or(0)
        );
    }
    Ok(())
}

pub fn audit_command(
    config: &LedgerConfig,
    student: &str,
    facts: &Path,
    limit: Option<usize>,
) -> Result<()> {
    let ledger = XpLedger::with_config(config)?;
    let sources = JsonSources::load(facts)?;
    let limit = limit.unwrap_or(config.history_tail);
    let report = ledger.audit_report(&StudentId::from(student), &sources, limit)?;

    println!("Audit report for {}", report.student);
    println!(
        "  total: {} XP | weekly: {} XP | level {} ({}) {:.0}% to next",
        report.total_xp,
        report.weekly_xp,
        report.progress.level,
        report.progress.title,
        report.progress.percentage
    );
    println!(
        "  badges claimed: {} of 39 {:?}",
        report.claimed_weeks.len(),
        report.claimed_weeks
    );
    println!(
        "  discrepancy: {}",
        if report.has_discrepancy { "YES" } else { "no" }
    );
    print_validation(&report.validation);

    if !report.recent_history.is_empty() {
        println!("  recent history:");
        for entry in &report.recent_history {
            println!(
                "    #{} {} {:+} XP ({} -> {})",
                entry.id,
                entry.kind.as_str(),
                entry.amount,
                entry.previous_total,
                entry.new_total
            );
        }
    }
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    println!(
        "  stored {} XP | history sum {} XP | source-derived {} XP{}",
        report.stored_total,
        report.ledger_total,
        report.calculated_total,
        if report.complete { "" } else { " (partial)" }
    );
    let fmt = |v: Option<i64>| v.map_or("?".to_string(), |v| v.to_string());
    println!(
        "  sources: reading {} + badges {} + family-battle {} + voting {}",
        fmt(report.sources.reading),
        report.sources.badges,
        fmt(report.sources.family_battle),
        fmt(report.sources.voting)
    );
    if report.is_valid {
        println!("  VALID: totals agree");
    } else {
        println!("  difference: {:+}", report.difference);
        for discrepancy in &report.discrepancies {
            println!("  - {discrepancy}");
        }
    }
}
