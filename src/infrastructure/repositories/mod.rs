//! Repository Implementations

mod ledger;

pub use ledger::{JsonLedgerRepository, LATEST_FILE, RUNS_DIR};
