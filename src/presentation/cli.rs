//! CLI Argument Parsing
//!
//! Global flags (--json, --verbose, --config) are inherited by all
//! subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// mocksmith - turn design mockups into UI source, idempotently
#[derive(Parser, Debug)]
#[command(name = "mocksmith")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable output (NDJSON events for generate)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: mocksmith.toml, then agents.config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what generate would do, without writing anything
    Plan {
        /// Treat changed mockups as updatable
        #[arg(long)]
        allow_update: bool,

        /// Restrict the plan to these slugs (comma-separated)
        #[arg(long, value_delimiter = ',', value_name = "SLUGS")]
        only: Vec<String>,
    },

    /// Generate source for new and changed mockups
    Generate {
        /// Regenerate outputs whose mockup changed
        #[arg(long)]
        allow_update: bool,

        /// Restrict the run to these slugs (comma-separated)
        #[arg(long, value_delimiter = ',', value_name = "SLUGS")]
        only: Vec<String>,

        /// Never prompt; policy scope decides every update
        #[arg(short, long)]
        yes: bool,

        /// Cancel (and roll back) if the run takes longer than this
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Roll back a run that never finalized
    Rollback {
        /// Run id (the timestamp in agent-run-<id>.json)
        run_id: String,
    },

    /// Show the latest-state index
    Ledger {
        /// Rebuild the index by replaying every run log
        #[arg(long)]
        rebuild: bool,
    },
}
