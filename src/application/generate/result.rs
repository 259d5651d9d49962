//! Generate Result

use std::path::PathBuf;

use crate::domain::entities::{Action, RunLog, RunOutcome};
use crate::domain::value_objects::RunId;

/// An earlier run settled before this one started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredRun {
    pub run_id: RunId,
    pub rolled_back: bool,
}

/// Result of a generate run
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub log: RunLog,
    /// Where the run log was written
    pub log_path: PathBuf,
    pub recovered: Vec<RecoveredRun>,
}

impl GenerateResult {
    pub fn exit_code(&self) -> i32 {
        self.log.exit_code
    }

    pub fn is_success(&self) -> bool {
        self.log.exit_code == 0
    }

    pub fn rolled_back(&self) -> bool {
        self.log.outcome == RunOutcome::RolledBack
    }

    pub fn count(&self, action: Action) -> usize {
        self.log.count_action(action)
    }

    /// Whether anything in the output tree changed
    pub fn has_changes(&self) -> bool {
        !self.rolled_back() && self.log.records.iter().any(|r| r.action.is_write())
    }
}
