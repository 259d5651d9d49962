//! Rollback command handler
//!
//! Settles one run by id: replays its journal if it never committed, or
//! drops a leftover journal if its run log exists. Idempotent.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use mocksmith::application::{recover, Recovery, RollbackController};
use mocksmith::domain::ports::{NoopEventSink, RunEventSink};
use mocksmith::domain::value_objects::RunId;
use mocksmith::infrastructure::{JsonEventSink, LocalFs, RunLock};
use mocksmith::presentation::factory;
use mocksmith::presentation::{create_renderer, OutputFormat};

/// Execute the rollback command
pub fn cmd_rollback(
    config_path: Option<&Path>,
    run_id: &str,
    json: bool,
    verbose: u8,
) -> Result<i32> {
    let run_id: RunId = run_id
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid run id '{}': {}", run_id, e))?;

    let loaded = super::load_config(config_path, json)?;
    let config = loaded.config;
    let state_dir = config.state_dir();
    let mockup_root = config.mockup_root();

    let _lock = RunLock::acquire(&state_dir)?;

    // Rollback always completes once started; a second Ctrl+C is the only way out.
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(super::EXIT_ROLLED_BACK);
        }
    })
    .context("installing Ctrl+C handler")?;

    let events: Box<dyn RunEventSink> = if json {
        Box::new(JsonEventSink::stdout().for_command("rollback"))
    } else {
        Box::new(NoopEventSink)
    };

    let fs = LocalFs::new();
    let ledger = factory::create_ledger(&config);
    let controller = RollbackController::new(&fs, &state_dir).guarding(&mockup_root);
    let recovery = recover(&controller, &ledger, &run_id, events.as_ref())?;
    tracing::info!(run_id = %run_id, outcome = ?recovery, "rollback command finished");

    let renderer = create_renderer(
        OutputFormat::from_flag(json),
        std::io::stdout().is_terminal(),
        verbose,
    );
    print!("{}", renderer.recovery(&run_id, &recovery));
    if json {
        println!();
    }

    Ok(match recovery {
        Recovery::Unknown => super::EXIT_SETUP,
        _ => 0,
    })
}
