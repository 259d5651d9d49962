//! Plan command handler
//!
//! Scan, compare and plan; print the plan; write nothing.

use std::path::Path;

use anyhow::Result;
use is_terminal::IsTerminal;

use mocksmith::presentation::factory;
use mocksmith::presentation::{create_renderer, OutputFormat};

/// Execute the plan command
pub fn cmd_plan(
    config_path: Option<&Path>,
    allow_update: bool,
    only: &[String],
    json: bool,
    verbose: u8,
) -> Result<i32> {
    let loaded = super::load_config(config_path, json)?;
    let config = loaded.config;
    let policy = config.policy(allow_update, only);

    let use_case = factory::create_plan_use_case(&config)?;
    let prepared = use_case.execute(&config.output_root(), &policy)?;

    let renderer = create_renderer(
        OutputFormat::from_flag(json),
        std::io::stdout().is_terminal(),
        verbose,
    );
    print!("{}", renderer.plan(&prepared));
    if json {
        println!();
    }
    Ok(0)
}
