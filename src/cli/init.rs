//! `init` command

use std::path::Path;

use anyhow::Result;

use readquest::config::{self, LedgerConfig};
use readquest::ledger::XpLedger;

/// Write a default config file and create the ledger database.
pub fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path);

    LedgerConfig::write_default(&path, force)?;
    println!("Wrote default config to {}", path.display());

    let config = LedgerConfig::load(Some(&path))?;
    XpLedger::with_config(&config)?;
    println!("Created ledger database at {}", config.db_path().display());
    Ok(())
}
