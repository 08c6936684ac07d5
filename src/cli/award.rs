//! `award` and `reset` commands

use anyhow::{bail, Result};

use readquest::config::LedgerConfig;
use readquest::domain::{StudentId, XpKind, XpMetadata};
use readquest::ledger::{AwardRequest, XpLedger};

#[allow(clippy::too_many_arguments)]
pub fn award_command(
    config: &LedgerConfig,
    student: &str,
    amount: i64,
    kind: &str,
    week: Option<u8>,
    note: Option<String>,
    source: Option<String>,
    admin: bool,
) -> Result<()> {
    let Some(kind) = XpKind::parse(kind) else {
        bail!(
            "unknown XP kind '{kind}' (expected one of: reading, badge, family_battle, \
             family_battle_mvp, manual_adjustment, voting)"
        );
    };

    let ledger = XpLedger::with_config(config)?;
    let request = AwardRequest {
        student: StudentId::from(student),
        amount,
        kind,
        badge_week: week,
        metadata: XpMetadata {
            description: note.unwrap_or_default(),
            source,
            by_admin: admin,
        },
    };

    let receipt = ledger.award_xp(&request)?;
    if receipt.duplicate {
        println!(
            "Badge for week {} already claimed by {student}; total unchanged at {} XP.",
            week.unwrap_or(0),
            receipt.new_total
        );
        return Ok(());
    }

    println!(
        "Awarded {amount:+} XP ({kind}) to {student}: {} -> {} XP",
        receipt.previous_total, receipt.new_total
    );
    if let Some(level_up) = receipt.level_up {
        println!(
            "Level up! {} -> {} ({})",
            level_up.old_level, level_up.new_level, level_up.new_title
        );
    }
    Ok(())
}

pub fn reset_command(config: &LedgerConfig, student: &str, yes: bool) -> Result<()> {
    if !yes {
        bail!("reset wipes {student}'s ledger, claims, and total; re-run with --yes to confirm");
    }
    let ledger = XpLedger::with_config(config)?;
    ledger.reset_student(&StudentId::from(student))?;
    println!("Reset all XP state for {student}.");
    Ok(())
}
