//! mocksmith CLI
//!
//! Usage: mocksmith <COMMAND>
//!
//! Commands:
//!   plan      Show what generate would do
//!   generate  Generate source for new and changed mockups
//!   rollback  Roll back a run that never finalized
//!   ledger    Show or rebuild the latest-state index

mod commands;

use clap::Parser;

use mocksmith::presentation::{Cli, Commands};

use commands::generate::{cmd_generate, GenerateArgs};
use commands::ledger::cmd_ledger;
use commands::plan::cmd_plan;
use commands::rollback::cmd_rollback;

fn main() {
    let cli = Cli::parse();
    mocksmith::logging::init(cli.verbose);

    let config = cli.config.as_deref();
    let outcome = match cli.command {
        Commands::Plan { allow_update, only } => {
            cmd_plan(config, allow_update, &only, cli.json, cli.verbose)
        }
        Commands::Generate {
            allow_update,
            only,
            yes,
            timeout,
        } => {
            let args = GenerateArgs {
                allow_update,
                only,
                yes,
                timeout,
            };
            cmd_generate(config, &args, cli.json, cli.verbose)
        }
        Commands::Rollback { run_id } => cmd_rollback(config, &run_id, cli.json, cli.verbose),
        Commands::Ledger { rebuild } => cmd_ledger(config, rebuild, cli.json, cli.verbose),
    };

    let code = match outcome {
        Ok(code) => code,
        Err(err) => {
            commands::report_error(&err, cli.json);
            commands::exit_code_for(&err)
        }
    };
    std::process::exit(code);
}
