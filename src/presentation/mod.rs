//! Presentation Layer
//!
//! Everything between the terminal and the use cases: clap arguments, the
//! factory that wires configuration to concrete adapters, and the text/JSON
//! renderers for plans, runs, rollbacks and the ledger.

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, Commands};
pub use factory::{create_generate_use_case, create_plan_use_case};
pub use output::{create_renderer, OutputFormat, Renderer};
