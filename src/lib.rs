//! mocksmith - mockup-to-source generation agent
//!
//! mocksmith scans a tree of design mockups, compares it against the
//! generated source tree and the run ledger, and generates or updates UI
//! source for new and changed mockups. Every run is recorded in
//! `runs/agent-run-<id>.json`, repeated runs are idempotent, and a run that
//! fails to commit is rolled back completely.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

// Re-exports for convenience
pub use application::{GenerateOptions, GenerateResult, GenerateUseCase, PlanUseCase};
pub use config::Config;
pub use error::{MocksmithError, MocksmithResult};
