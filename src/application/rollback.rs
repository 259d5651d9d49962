//! Rollback Controller
//!
//! Restores every journaled path of a run to its prior state, newest entry
//! first, then removes directories the run created if they are empty again.
//! Each restore is an idempotent "make it so", so re-running after a partial
//! rollback converges on the same tree.

use std::path::{Path, PathBuf};

use crate::domain::ports::{FileSystem, LedgerRepository, RunEvent, RunEventSink};
use crate::domain::value_objects::{Fingerprint, RunId};
use crate::error::{MocksmithError, MocksmithResult};

use super::journal::{backup_path, journal_dir, load_journal, remove_journal, PriorState};

/// What a rollback did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// False when the run had no journal (already finalized or rolled back)
    pub found: bool,
    pub restored: Vec<String>,
    pub removed: Vec<String>,
}

impl RollbackReport {
    pub fn touched(&self) -> usize {
        self.restored.len() + self.removed.len()
    }
}

pub struct RollbackController<'a> {
    fs: &'a dyn FileSystem,
    state_dir: &'a Path,
    mockup_root: Option<&'a Path>,
}

impl<'a> RollbackController<'a> {
    pub fn new(fs: &'a dyn FileSystem, state_dir: &'a Path) -> Self {
        Self {
            fs,
            state_dir,
            mockup_root: None,
        }
    }

    /// Refuse to restore anything under the mockup tree.
    pub fn guarding(mut self, mockup_root: &'a Path) -> Self {
        self.mockup_root = Some(mockup_root);
        self
    }

    pub fn rollback(
        &self,
        run_id: &RunId,
        events: &dyn RunEventSink,
    ) -> MocksmithResult<RollbackReport> {
        let Some(doc) = load_journal(self.fs, self.state_dir, run_id)? else {
            tracing::info!(run_id = %run_id, "no journal; nothing to roll back");
            return Ok(RollbackReport::default());
        };

        tracing::warn!(run_id = %run_id, entries = doc.entries.len(), "rolling back run");
        events.on_event(RunEvent::RollbackStarted {
            run_id: run_id.clone(),
            entries: doc.entries.len(),
        });

        let mut report = RollbackReport {
            found: true,
            ..Default::default()
        };

        for entry in doc.entries.iter().rev() {
            let target = doc.output_root.join(&entry.path);
            self.guard(run_id, &target)?;

            match &entry.prior {
                PriorState::Absent => match self.fs.remove(&target) {
                    Ok(()) => report.removed.push(entry.path.clone()),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(self.failure(run_id, &target, e.to_string())),
                },
                PriorState::Existed {
                    backup,
                    fingerprint,
                } => {
                    let current = self.fs.hash(&target).ok();
                    if current.as_ref() != Some(fingerprint) {
                        let bytes = self
                            .fs
                            .read(&backup_path(self.state_dir, run_id, backup))
                            .map_err(|e| self.failure(run_id, &target, e.to_string()))?;
                        if &Fingerprint::from_bytes(&bytes) != fingerprint {
                            return Err(self.failure(
                                run_id,
                                &target,
                                format!(
                                    "backup {} does not match its recorded fingerprint",
                                    backup
                                ),
                            ));
                        }
                        self.fs
                            .write(&target, &bytes)
                            .map_err(|e| self.failure(run_id, &target, e.to_string()))?;
                    }
                    report.restored.push(entry.path.clone());
                }
            }

            for dir in entry.created_dirs.iter().rev() {
                let path = doc.output_root.join(dir);
                // Only empty directories go; anything else stays.
                if let Err(e) = self.fs.remove_dir(&path) {
                    tracing::debug!(dir = %path.display(), error = %e, "keeping directory");
                }
            }
        }

        remove_journal(self.fs, &journal_dir(self.state_dir, run_id))?;

        events.on_event(RunEvent::RolledBack {
            run_id: run_id.clone(),
            restored: report.touched(),
        });
        tracing::warn!(run_id = %run_id, restored = report.touched(), "rollback complete");
        Ok(report)
    }

    fn guard(&self, run_id: &RunId, target: &Path) -> MocksmithResult<()> {
        if let Some(root) = self.mockup_root {
            if target.starts_with(root) {
                return Err(self.failure(
                    run_id,
                    target,
                    "path is inside the mockup tree".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn failure(&self, run_id: &RunId, path: &Path, message: String) -> MocksmithError {
        MocksmithError::Rollback {
            run_id: run_id.to_string(),
            path: PathBuf::from(path),
            message,
        }
    }
}

/// How an unfinalized or named run was settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Neither a journal nor a run log exists for the id
    Unknown,
    /// The run committed and its journal is already gone
    AlreadyFinalized,
    /// The run log was written but the journal survived; the journal was dropped
    Finalized,
    /// The run never committed; its journal was replayed
    RolledBack(RollbackReport),
}

/// Settle a run by id.
///
/// A run log is the commit point: if one exists the run's changes stand and
/// a leftover journal is only deleted (and the latest-state index caught up).
/// Without a run log, the journal is replayed.
pub fn recover(
    controller: &RollbackController,
    ledger: &dyn LedgerRepository,
    run_id: &RunId,
    events: &dyn RunEventSink,
) -> MocksmithResult<Recovery> {
    let log = ledger
        .load_run(run_id)
        .map_err(|e| MocksmithError::Ledger(e.to_string()))?;
    let has_journal = controller.fs.is_dir(&journal_dir(controller.state_dir, run_id));

    match (log, has_journal) {
        (Some(log), true) => {
            let mut latest = ledger
                .load_latest()
                .map_err(|e| MocksmithError::Ledger(e.to_string()))?;
            if latest.last_run.as_ref().map_or(true, |last| last < run_id) {
                latest.apply(&log);
                ledger
                    .save_latest(&latest)
                    .map_err(|e| MocksmithError::Ledger(e.to_string()))?;
            }
            remove_journal(controller.fs, &journal_dir(controller.state_dir, run_id))?;
            tracing::info!(run_id = %run_id, "finalized committed run");
            Ok(Recovery::Finalized)
        }
        (Some(_), false) => Ok(Recovery::AlreadyFinalized),
        (None, true) => controller.rollback(run_id, events).map(Recovery::RolledBack),
        (None, false) => Ok(Recovery::Unknown),
    }
}
