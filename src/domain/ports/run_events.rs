//! Run Event Port
//!
//! Observable interface for generate runs. Drives the NDJSON event stream
//! and lets tests watch the executor.

use crate::domain::entities::{Action, ArtifactKind, RunOutcome, SkipReason};
use crate::domain::services::StepKind;
use crate::domain::value_objects::{EntityKey, RunId};

/// Event emitted during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Run started
    Started { run_id: RunId },

    /// An unfinalized journal from an earlier run was handled
    Recovered { run_id: RunId, rolled_back: bool },

    /// Both trees were scanned
    Scanned {
        mockup_count: usize,
        output_count: usize,
    },

    /// Plan built
    Planned {
        generate: usize,
        update: usize,
        remove: usize,
        report_only: usize,
    },

    /// Step execution started
    StepStarted {
        index: usize,
        key: EntityKey,
        kind: StepKind,
    },

    /// A file was moved into place
    FileCommitted {
        index: usize,
        key: EntityKey,
        kind: ArtifactKind,
        path: String,
    },

    /// Step finished without a run-fatal error
    StepFinished {
        index: usize,
        key: EntityKey,
        action: Action,
        reason: Option<SkipReason>,
    },

    /// Step failed
    StepFailed {
        index: usize,
        key: EntityKey,
        error: String,
    },

    /// Rollback started
    RollbackStarted { run_id: RunId, entries: usize },

    /// Rollback finished
    RolledBack { run_id: RunId, restored: usize },

    /// Run completed
    Completed {
        run_id: RunId,
        outcome: RunOutcome,
        exit_code: i32,
        generated: usize,
        updated: usize,
        removed: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Trait for receiving run events
///
/// Implementations can be:
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait RunEventSink: Send + Sync {
    /// Handle a run event
    fn on_event(&self, event: RunEvent);

    /// Check if this sink wants per-step and per-file events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn on_event(&self, _event: RunEvent) {
        // Do nothing
    }

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
