use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use readquest::config::LedgerConfig;

mod cli;

#[derive(Parser)]
#[command(name = "readquest")]
#[command(about = "Reading-program XP ledger - award, audit, and reconcile student XP")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.readquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a default config file and create the ledger database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Award XP to a student
    Award {
        student: String,
        /// Signed amount (negative only for manual_adjustment)
        #[arg(allow_hyphen_values = true)]
        amount: i64,
        /// XP kind: reading, badge, family_battle, family_battle_mvp,
        /// manual_adjustment, voting
        #[arg(long)]
        kind: String,
        /// Season week (required for badge awards)
        #[arg(long)]
        week: Option<u8>,
        /// Free-form description stored with the entry
        #[arg(long)]
        note: Option<String>,
        /// Source tag stored with the entry
        #[arg(long)]
        source: Option<String>,
        /// Mark the entry as admin-initiated
        #[arg(long)]
        admin: bool,
    },

    /// Show a student's XP history, most recent first
    History {
        student: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Validate a student's stored total against a facts file (read-only)
    Validate {
        student: String,
        /// JSON facts file with the independent source values
        #[arg(long)]
        facts: PathBuf,
    },

    /// Correct a student's total via a compensating ledger entry
    Reconcile {
        student: String,
        #[arg(long)]
        facts: PathBuf,
        /// Use the ledger sum as the truth instead of the independent sources
        #[arg(long)]
        use_history: bool,
        /// Actually apply the correction (otherwise only the report is shown)
        #[arg(long)]
        yes: bool,
    },

    /// Full read-only audit report for a student
    Audit {
        student: String,
        #[arg(long)]
        facts: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Evaluate and award a weekly badge from a facts file
    CheckBadge {
        student: String,
        #[arg(long)]
        facts: PathBuf,
        /// Season week (defaults to the current week)
        #[arg(long)]
        week: Option<u8>,
    },

    /// List the badge calendar (or one week's badge)
    Badges {
        #[arg(long)]
        week: Option<u8>,
    },

    /// Show the current season week
    Week,

    /// Wipe one student's XP state
    Reset {
        student: String,
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = LedgerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(cli.config.as_deref(), force)?;
        }
        Commands::Award {
            student,
            amount,
            kind,
            week,
            note,
            source,
            admin,
        } => {
            cli::award::award_command(&config, &student, amount, &kind, week, note, source, admin)?;
        }
        Commands::History { student, limit } => {
            cli::history::history_command(&config, &student, limit)?;
        }
        Commands::Validate { student, facts } => {
            cli::audit::validate_command(&config, &student, &facts)?;
        }
        Commands::Reconcile {
            student,
            facts,
            use_history,
            yes,
        } => {
            cli::audit::reconcile_command(&config, &student, &facts, use_history, yes)?;
        }
        Commands::Audit {
            student,
            facts,
            limit,
        } => {
            cli::audit::audit_command(&config, &student, &facts, limit)?;
        }
        Commands::CheckBadge {
            student,
            facts,
            week,
        } => {
            cli::badges::check_badge_command(&config, &student, &facts, week)?;
        }
        Commands::Badges { week } => {
            cli::badges::badges_command(&config, week)?;
        }
        Commands::Week => {
            cli::badges::week_command(&config)?;
        }
        Commands::Reset { student, yes } => {
            cli::award::reset_command(&config, &student, yes)?;
        }
    }

    Ok(())
}
