//! Ledger configuration
//!
//! Loaded from `~/.readquest/config.toml` (or a path given on the command
//! line). Every field has a default so a missing file means a working
//! out-of-the-box setup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::badges::SeasonCalendar;
use crate::ledger::XpRates;

/// Data directory for the ledger database and config (`~/.readquest`).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".readquest")
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Tunable knobs of the XP engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger database location; defaults to `~/.readquest/ledger.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// First day of badge week 1. Defaults to September 1 of the school year
    /// containing today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_start: Option<NaiveDate>,

    /// XP granted per completed reading minute.
    #[serde(default = "default_reading_xp_per_minute")]
    pub reading_xp_per_minute: i64,

    /// XP granted once for casting the yearly book vote.
    #[serde(default = "default_voting_xp")]
    pub voting_xp: i64,

    /// Attempts before a conflicting award surfaces as fatal.
    #[serde(default = "default_award_retry_budget")]
    pub award_retry_budget: u32,

    /// Default number of history entries shown in reports.
    #[serde(default = "default_history_tail")]
    pub history_tail: usize,
}

fn default_reading_xp_per_minute() -> i64 {
    1
}

fn default_voting_xp() -> i64 {
    50
}

fn default_award_retry_budget() -> u32 {
    5
}

fn default_history_tail() -> usize {
    20
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            season_start: None,
            reading_xp_per_minute: default_reading_xp_per_minute(),
            voting_xp: default_voting_xp(),
            award_retry_budget: default_award_retry_budget(),
            history_tail: default_history_tail(),
        }
    }
}

impl LedgerConfig {
    /// Load the config from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Write a default config file, refusing to clobber one unless `force`.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!("config already exists: {} (use --force)", path.display());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let rendered =
            toml::to_string_pretty(&Self::default()).context("Failed to render default config")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir().join("ledger.db"))
    }

    pub fn rates(&self) -> XpRates {
        XpRates {
            reading_xp_per_minute: self.reading_xp_per_minute,
            voting_xp: self.voting_xp,
        }
    }

    /// Season calendar from the configured anchor, or inferred from today.
    pub fn calendar(&self) -> SeasonCalendar {
        match self.season_start {
            Some(start) => SeasonCalendar::new(start),
            None => SeasonCalendar::for_today(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.reading_xp_per_minute, 1);
        assert_eq!(config.voting_xp, 50);
        assert_eq!(config.award_retry_budget, 5);
        assert!(config.db_path().ends_with("ledger.db"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: LedgerConfig = toml::from_str("voting_xp = 75\n").unwrap();
        assert_eq!(config.voting_xp, 75);
        assert_eq!(config.reading_xp_per_minute, 1);
        assert_eq!(config.history_tail, 20);
    }

    #[test]
    fn test_season_start_parses_as_date() {
        let config: LedgerConfig = toml::from_str("season_start = \"2025-09-01\"\n").unwrap();
        let calendar = config.calendar();
        assert_eq!(
            calendar.start(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        LedgerConfig::write_default(&path, false).unwrap();
        // Second write without force must refuse
        assert!(LedgerConfig::write_default(&path, false).is_err());

        let loaded = LedgerConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.voting_xp, LedgerConfig::default().voting_xp);
    }
}
