//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod collaborators;
pub mod file_system;
pub mod ledger_repository;
pub mod mockup_source;
pub mod run_events;
pub mod update_confirmation;

pub use collaborators::{
    BindingGenerator, CandidateFile, CodeEmitter, ComponentNode, ComponentTree, EmitRequest,
    MockupParser, ParseError,
};
pub use file_system::{FileSystem, FsError, FsResult};
pub use ledger_repository::{LedgerError, LedgerRepository, LedgerResult};
pub use mockup_source::{MockupScan, MockupSource};
pub use run_events::{NoopEventSink, RunEvent, RunEventSink};
pub use update_confirmation::{
    ConfirmChoice, PolicyScopeConfirmation, UpdateConfirmation, UpdatePrompt, UpdateReason,
};
