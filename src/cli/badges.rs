//! `badges`, `week`, and `check-badge` commands

use std::path::Path;

use anyhow::{bail, Result};

use readquest::badges::{BadgeDefinition, BADGES};
use readquest::config::LedgerConfig;
use readquest::domain::StudentId;
use readquest::ledger::{JsonSources, XpLedger};

pub fn badges_command(config: &LedgerConfig, week: Option<u8>) -> Result<()> {
    match week {
        Some(week) => {
            let Some(badge) = BadgeDefinition::for_week(week) else {
                bail!("week {week} is not in the badge calendar (1-39)");
            };
            print_badge(badge);
        }
        None => {
            let current = config.calendar().current_week();
            for badge in BADGES {
                let marker = if badge.week == current { ">" } else { " " };
                println!(
                    "{marker} week {:>2}  {:<22} {:>4} XP  [{}]",
                    badge.week,
                    badge.name,
                    badge.xp,
                    badge.trigger.as_str()
                );
            }
        }
    }
    Ok(())
}

pub fn week_command(config: &LedgerConfig) -> Result<()> {
    let calendar = config.calendar();
    let week = calendar.current_week();
    println!("Season started {}; current badge week: {week}", calendar.start());
    match readquest::badges::current_week_badge(&calendar) {
        None => println!("The program has not started yet."),
        Some(badge) => print_badge(badge),
    }
    Ok(())
}

pub fn check_badge_command(
    config: &LedgerConfig,
    student: &str,
    facts_path: &Path,
    week: Option<u8>,
) -> Result<()> {
    let sources = JsonSources::load(facts_path)?;
    let Some(facts) = sources.week_facts() else {
        bail!(
            "facts file {} carries no bookshelf section; badge checks need week facts",
            facts_path.display()
        );
    };

    let week = week.unwrap_or_else(|| config.calendar().current_week());
    if week == 0 {
        println!("Badge week 0: the program has not started, nothing to earn.");
        return Ok(());
    }

    let ledger = XpLedger::with_config(config)?;
    match ledger.check_week_badge(&StudentId::from(student), week, &facts)? {
        None => println!("Week {week} badge not earned with the given facts."),
        Some(receipt) if receipt.duplicate => {
            println!("Week {week} badge already claimed; total unchanged.");
        }
        Some(receipt) => {
            let badge = BadgeDefinition::for_week(week).expect("validated above");
            println!(
                "Earned '{}' (+{} XP): total now {} XP.",
                badge.name, badge.xp, receipt.new_total
            );
        }
    }
    Ok(())
}

fn print_badge(badge: &BadgeDefinition) {
    println!(
        "week {:>2}  {} ({} XP, {} badge)\n         {}",
        badge.week,
        badge.name,
        badge.xp,
        badge.trigger.as_str(),
        badge.description
    );
}
