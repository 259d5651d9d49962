//! Subcommand handlers
//!
//! Each handler returns the process exit code; `main` exits with it.

pub mod generate;
pub mod ledger;
pub mod plan;
pub mod rollback;

use std::path::Path;

use anyhow::Result;

use mocksmith::config::{discover, ConfigWarning, LoadedConfig};
use mocksmith::MocksmithError;

/// Exit code for setup, discovery, configuration and lock failures
pub const EXIT_SETUP: i32 = 2;
/// Exit code when a run was rolled back or cancelled
pub const EXIT_ROLLED_BACK: i32 = 3;

/// Load configuration from the working directory and report unknown keys.
pub fn load_config(explicit: Option<&Path>, json: bool) -> Result<LoadedConfig> {
    let cwd = std::env::current_dir()?;
    let loaded = discover(&cwd, explicit)?;
    if !json {
        for warning in &loaded.warnings {
            eprintln!("{}", format_config_warning(warning));
        }
    }
    for warning in &loaded.warnings {
        tracing::warn!(
            key = %warning.key,
            file = %warning.file.display(),
            "unknown configuration key"
        );
    }
    Ok(loaded)
}

fn format_config_warning(warning: &ConfigWarning) -> String {
    let location = match warning.line {
        Some(line) => format!("{}:{}", warning.file.display(), line),
        None => warning.file.display().to_string(),
    };
    match &warning.suggestion {
        Some(suggestion) => format!(
            "warning: unknown key '{}' in {} (did you mean '{}'?)",
            warning.key, location, suggestion
        ),
        None => format!("warning: unknown key '{}' in {}", warning.key, location),
    }
}

/// Exit code for an error that ended a command early.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<MocksmithError>() {
        Some(MocksmithError::Rollback { .. } | MocksmithError::Cancelled { .. }) => {
            EXIT_ROLLED_BACK
        }
        _ => EXIT_SETUP,
    }
}

/// Print an error the way every command does.
pub fn report_error(err: &anyhow::Error, json: bool) {
    if json {
        let kind = err
            .downcast_ref::<MocksmithError>()
            .map(MocksmithError::kind)
            .unwrap_or("error");
        println!(
            "{}",
            serde_json::json!({
                "event": "error",
                "kind": kind,
                "message": format!("{:#}", err),
            })
        );
    } else {
        eprintln!("Error: {:#}", err);
    }
}
