//! Generate command handler
//!
//! Holds the run lock for the whole run. Ctrl+C and `--timeout` set the
//! cancellation flag; the use case notices between steps and rolls back.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;

use mocksmith::config::Config;
use mocksmith::domain::ports::{
    NoopEventSink, PolicyScopeConfirmation, RunEventSink, UpdateConfirmation,
};
use mocksmith::infrastructure::{InteractiveConfirmation, JsonEventSink, RunLock};
use mocksmith::presentation::factory;
use mocksmith::presentation::{create_renderer, OutputFormat};

/// Flags for one generate invocation
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub allow_update: bool,
    pub only: Vec<String>,
    pub yes: bool,
    pub timeout: Option<u64>,
}

/// Execute the generate command
pub fn cmd_generate(
    config_path: Option<&Path>,
    args: &GenerateArgs,
    json: bool,
    verbose: u8,
) -> Result<i32> {
    let loaded = super::load_config(config_path, json)?;
    let config = loaded.config;

    let _lock = RunLock::acquire(&config.state_dir())?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl+C handler")?;

    let interactive = wants_interactive(&config, args.yes, json);
    let confirmation: Arc<dyn UpdateConfirmation> = if interactive {
        Arc::new(InteractiveConfirmation::new())
    } else {
        Arc::new(PolicyScopeConfirmation)
    };
    let events: Arc<dyn RunEventSink> = if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(NoopEventSink)
    };

    let options = factory::generate_options(&config)
        .with_policy(config.policy(args.allow_update, &args.only))
        .with_interactive(interactive)
        .with_timeout(args.timeout.map(Duration::from_secs))
        .with_cancel(cancel);

    let use_case = factory::create_generate_use_case(&config)?;
    let result = use_case.execute(&options, events, confirmation)?;

    let renderer = create_renderer(
        OutputFormat::from_flag(json),
        std::io::stdout().is_terminal(),
        verbose,
    );
    let rendered = renderer.run(&result);
    if json {
        println!("{}", rendered);
    } else {
        print!("{}", rendered);
    }
    Ok(result.exit_code())
}

/// `--yes` and `--json` never prompt; otherwise configuration, then the terminal, decide.
fn wants_interactive(config: &Config, yes: bool, json: bool) -> bool {
    if yes || json {
        return false;
    }
    config
        .generate
        .interactive
        .unwrap_or_else(|| std::io::stdin().is_terminal() && std::io::stdout().is_terminal())
}
