//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `PlanUseCase` - Scan, compare and plan without writing
//! - `GenerateUseCase` - Plan, execute, record; roll back on a fatal error
//! - `recover` - Settle a run by id (rollback command, crash recovery)
//!
//! ## Services
//!
//! - `Executor` - Stage, verify, confirm and commit one plan step
//! - `CommitJournal` - Write-ahead record of prior output state
//! - `OutputScanner` - Join the ledger with the output tree on disk

pub mod executor;
pub mod generate;
pub mod journal;
pub mod output_scan;
pub mod plan;
pub mod rollback;

pub use executor::{ExecutionContext, Executor};
pub use generate::{Collaborators, GenerateOptions, GenerateResult, GenerateUseCase, RecoveredRun};
pub use journal::{pending_journals, CommitJournal, JournalDocument, JournalEntry, PriorState};
pub use output_scan::OutputScanner;
pub use plan::{prepare, PlanUseCase, Prepared};
pub use rollback::{recover, Recovery, RollbackController, RollbackReport};
