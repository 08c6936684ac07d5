//! `history` command

use anyhow::Result;
use chrono::DateTime;

use readquest::config::LedgerConfig;
use readquest::domain::StudentId;
use readquest::ledger::XpLedger;

pub fn history_command(config: &LedgerConfig, student: &str, limit: Option<usize>) -> Result<()> {
    let ledger = XpLedger::with_config(config)?;
    let student = StudentId::from(student);
    let limit = limit.unwrap_or(config.history_tail);

    let aggregate = ledger.student(&student)?;
    let entries = ledger.history(&student, limit)?;

    println!(
        "{}: {} XP (level {}, {} XP this week)",
        student, aggregate.total_xp, aggregate.level, aggregate.weekly_xp
    );
    if entries.is_empty() {
        println!("No history entries.");
        return Ok(());
    }

    for entry in entries {
        let when = DateTime::from_timestamp_millis(entry.created_at)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "#{:<6} {}  {:>6}  {:+6} XP  ({} -> {})",
            entry.id,
            when,
            entry.kind.as_str(),
            entry.amount,
            entry.previous_total,
            entry.new_total
        );
        if let Some(week) = entry.badge_week {
            line.push_str(&format!("  week {week}"));
        }
        if !entry.description.is_empty() {
            line.push_str(&format!("  {}", entry.description));
        }
        if entry.by_admin {
            line.push_str("  [admin]");
        }
        println!("{line}");
    }
    Ok(())
}
