//! Ledger command handler
//!
//! Shows the latest-state index, or rebuilds it from the run logs.

use std::path::Path;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use mocksmith::domain::ports::LedgerRepository;
use mocksmith::infrastructure::RunLock;
use mocksmith::presentation::factory;
use mocksmith::presentation::{create_renderer, OutputFormat};

/// Execute the ledger command
pub fn cmd_ledger(
    config_path: Option<&Path>,
    rebuild: bool,
    json: bool,
    verbose: u8,
) -> Result<i32> {
    let loaded = super::load_config(config_path, json)?;
    let config = loaded.config;
    let ledger = factory::create_ledger(&config);

    let latest = if rebuild {
        let _lock = RunLock::acquire(&config.state_dir())?;
        let latest = ledger.rebuild_latest().context("rebuilding latest-state index")?;
        tracing::info!(keys = latest.len(), "latest-state index rebuilt");
        latest
    } else {
        ledger.load_latest().context("reading latest-state index")?
    };

    let renderer = create_renderer(
        OutputFormat::from_flag(json),
        std::io::stdout().is_terminal(),
        verbose,
    );
    print!("{}", renderer.ledger(&latest, rebuild));
    if json {
        println!();
    }
    Ok(0)
}
