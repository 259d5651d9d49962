//! LedgerRepository port - persistence for run logs and the latest-state index
//!
//! Run logs are append-only: a run id is written exactly once. The
//! latest-state index is rewritten after every run and can be rebuilt from
//! the run logs at any time.

use std::path::PathBuf;

use crate::domain::entities::{LatestState, RunLog};
use crate::domain::value_objects::RunId;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger operation errors
#[derive(Debug)]
pub enum LedgerError {
    /// A run log with this id already exists
    AlreadyRecorded(RunId),
    /// Invalid ledger document
    InvalidFormat { path: PathBuf, message: String },
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::AlreadyRecorded(id) => write!(f, "run {} is already recorded", id),
            LedgerError::InvalidFormat { path, message } => {
                write!(f, "invalid ledger file {}: {}", path.display(), message)
            }
            LedgerError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err)
    }
}

/// Abstract repository for the run ledger
pub trait LedgerRepository {
    /// Write a new run log; fails if the run id was already recorded
    fn append_run(&self, log: &RunLog) -> LedgerResult<PathBuf>;

    /// Load one run log
    fn load_run(&self, id: &RunId) -> LedgerResult<Option<RunLog>>;

    /// All recorded run ids, oldest first
    fn list_runs(&self) -> LedgerResult<Vec<RunId>>;

    /// Load the latest-state index, empty if none was written yet
    fn load_latest(&self) -> LedgerResult<LatestState>;

    /// Replace the latest-state index
    fn save_latest(&self, state: &LatestState) -> LedgerResult<()>;

    fn run_exists(&self, id: &RunId) -> bool {
        matches!(self.load_run(id), Ok(Some(_)))
    }

    /// Rebuild the latest-state index by replaying every run log
    fn rebuild_latest(&self) -> LedgerResult<LatestState> {
        let mut logs = Vec::new();
        for id in self.list_runs()? {
            if let Some(log) = self.load_run(&id)? {
                logs.push(log);
            }
        }
        let state = LatestState::replay(logs);
        self.save_latest(&state)?;
        Ok(state)
    }
}
