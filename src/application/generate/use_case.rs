//! Generate Use Case
//!
//! One run, start to finish:
//! 1. Settle journals left by crashed runs
//! 2. Scan, observe and plan (see `application::plan`)
//! 3. Execute steps in plan order, checking for cancellation between steps
//! 4. On a run-fatal error, roll back everything this run committed
//! 5. Re-scan the mockup tree to confirm it was never touched
//! 6. Write the run log (the commit point), update the latest-state index,
//!    drop the journal

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::application::executor::{ExecutionContext, Executor};
use crate::application::journal::{journal_dir, pending_journals, CommitJournal};
use crate::application::plan::{prepare, Prepared};
use crate::application::rollback::{recover, Recovery, RollbackController};
use crate::domain::entities::{
    Action, DiscoveryRecord, RecordedError, RunLog, RunOutcome, RunRecord, SkipReason,
    LEDGER_VERSION,
};
use crate::domain::ports::{
    BindingGenerator, CodeEmitter, FileSystem, LedgerRepository, MockupParser, MockupSource,
    RunEvent, RunEventSink, UpdateConfirmation,
};
use crate::domain::services::{PlanStep, StepKind};
use crate::domain::value_objects::RunId;
use crate::error::{MocksmithError, MocksmithResult};

use super::options::GenerateOptions;
use super::result::{GenerateResult, RecoveredRun};

const STAGING_DIR: &str = "staging";

/// The pluggable parts of generation
pub struct Collaborators {
    pub source: Box<dyn MockupSource>,
    pub parser: Box<dyn MockupParser>,
    pub emitter: Box<dyn CodeEmitter>,
    pub bindings: Box<dyn BindingGenerator>,
}

/// Generate Use Case
pub struct GenerateUseCase<LR, FS>
where
    LR: LedgerRepository,
    FS: FileSystem,
{
    ledger: LR,
    file_system: FS,
    collaborators: Collaborators,
}

impl<LR, FS> GenerateUseCase<LR, FS>
where
    LR: LedgerRepository,
    FS: FileSystem,
{
    pub fn new(ledger: LR, file_system: FS, collaborators: Collaborators) -> Self {
        Self {
            ledger,
            file_system,
            collaborators,
        }
    }

    /// Execute one run.
    ///
    /// Returns `Err` only when no run log could be written: discovery and
    /// ledger failures before execution, or a rollback that could not
    /// complete (the journal is kept for the next attempt).
    pub fn execute(
        &self,
        options: &GenerateOptions,
        events: Arc<dyn RunEventSink>,
        confirmation: Arc<dyn UpdateConfirmation>,
    ) -> MocksmithResult<GenerateResult> {
        let started_at = Utc::now();
        let started = Instant::now();
        let mockup_root = self.collaborators.source.root().to_path_buf();

        let recovered = self.recover_pending(options, &mockup_root, events.as_ref())?;

        let run_id = self.next_run_id(&options.state_dir);
        tracing::info!(run_id = %run_id, "run started");
        events.on_event(RunEvent::Started {
            run_id: run_id.clone(),
        });

        let prepared = prepare(
            self.collaborators.source.as_ref(),
            &self.ledger,
            &self.file_system,
            &options.output_root,
            &options.policy,
        )?;
        let mut warnings = prepared.warnings();
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        events.on_event(RunEvent::Scanned {
            mockup_count: prepared.scan.inventory.len(),
            output_count: prepared.outputs.len(),
        });
        events.on_event(RunEvent::Planned {
            generate: prepared.plan.count(StepKind::Generate),
            update: prepared.plan.count(StepKind::Update),
            remove: prepared.plan.count(StepKind::Remove),
            report_only: prepared.plan.count(StepKind::ReportOnly),
        });

        let staging_dir = options
            .state_dir
            .join(STAGING_DIR)
            .join(run_id.as_str());
        let steps = prepared.plan.steps();

        let (mut records, fatal, journal) = {
            let ctx = ExecutionContext {
                fs: &self.file_system,
                parser: self.collaborators.parser.as_ref(),
                emitter: self.collaborators.emitter.as_ref(),
                bindings: self.collaborators.bindings.as_ref(),
                confirmation: confirmation.as_ref(),
                events: events.as_ref(),
                layout: &options.layout,
                output_root: &options.output_root,
                mockup_root: &mockup_root,
                staging_dir: staging_dir.clone(),
            };
            let journal = CommitJournal::new(
                &self.file_system,
                &options.state_dir,
                run_id.clone(),
                &options.output_root,
            );
            let owned = prepared
                .latest
                .owned_artifacts()
                .map(|(key, artifact)| (key.clone(), artifact.clone()));
            let mut executor = Executor::new(ctx, journal, owned);

            let mut records = Vec::with_capacity(steps.len());
            let mut fatal: Option<MocksmithError> = None;

            for (index, step) in steps.iter().enumerate() {
                if fatal.is_none() {
                    fatal = self.interruption(options, started);
                }
                if fatal.is_some() {
                    records.push(aborted_record(step));
                    continue;
                }
                match executor.execute(index, step) {
                    Ok(record) => records.push(record),
                    Err(err) => {
                        tracing::warn!(key = %step.key, error = %err, "run-fatal error");
                        events.on_event(RunEvent::StepFailed {
                            index,
                            key: step.key.clone(),
                            error: err.to_string(),
                        });
                        let mut record = aborted_record(step);
                        record.action = Action::Failed;
                        record.reason = None;
                        record.errors.push(RecordedError::from(&err));
                        records.push(record);
                        fatal = Some(err);
                    }
                }
            }
            // A cancel or timeout that lands during the last step still undoes it.
            if fatal.is_none() {
                fatal = self.interruption(options, started);
            }
            tracing::debug!(committed = executor.committed(), "execution finished");
            (records, fatal, executor.into_journal())
        };

        self.clean_staging(&options.state_dir, &staging_dir);

        let outcome = match &fatal {
            Some(cause) => {
                tracing::warn!(run_id = %run_id, cause = %cause, "rolling back run");
                RollbackController::new(&self.file_system, &options.state_dir)
                    .guarding(&mockup_root)
                    .rollback(&run_id, events.as_ref())?;
                for (record, step) in records.iter_mut().zip(steps) {
                    if record.action.is_write() {
                        record.action = Action::RolledBack;
                        record.artifacts =
                            step.artifacts.iter().map(|a| a.recorded.clone()).collect();
                    }
                }
                RunOutcome::RolledBack
            }
            None => RunOutcome::Committed,
        };

        let mockup_tree_verified = self.verify_mockup_tree(&prepared, &mut warnings);

        let exit_code = match outcome {
            RunOutcome::RolledBack => 3,
            RunOutcome::Committed if records.iter().any(RunRecord::is_problem) => 1,
            RunOutcome::Committed => 0,
        };

        let log = RunLog {
            version: LEDGER_VERSION,
            run_id: run_id.clone(),
            started_at,
            finished_at: Utc::now(),
            outcome,
            rollback_cause: fatal.as_ref().map(RecordedError::from),
            options: options.record(),
            discovered: prepared
                .scan
                .inventory
                .entities()
                .iter()
                .map(|entity| DiscoveryRecord {
                    key: entity.key().clone(),
                    fingerprint: entity.fingerprint().clone(),
                    sources: entity.source_files().iter().map(|f| f.path.clone()).collect(),
                })
                .collect(),
            records,
            mockup_tree_verified,
            warnings,
            exit_code,
        };

        let log_path = match self.ledger.append_run(&log) {
            Ok(path) => path,
            Err(e) => {
                // Without a run log nothing may stay committed.
                if outcome == RunOutcome::Committed {
                    RollbackController::new(&self.file_system, &options.state_dir)
                        .guarding(&mockup_root)
                        .rollback(&run_id, events.as_ref())?;
                }
                return Err(MocksmithError::Ledger(format!(
                    "cannot write run log for {}: {}",
                    run_id, e
                )));
            }
        };
        tracing::info!(path = %log_path.display(), "run log written");

        let mut latest = prepared.latest;
        latest.apply(&log);
        if let Err(e) = self.ledger.save_latest(&latest) {
            tracing::warn!(error = %e, "latest-state index not updated; run `ledger --rebuild`");
        }
        if outcome == RunOutcome::Committed {
            if let Err(e) = journal.finalize() {
                tracing::warn!(error = %e, "journal left behind; it will be finalized next run");
            }
        }

        events.on_event(RunEvent::Completed {
            run_id,
            outcome,
            exit_code,
            generated: log.count_action(Action::Generated),
            updated: log.count_action(Action::Updated),
            removed: log.count_action(Action::Removed),
            skipped: log.count_action(Action::Skipped),
            failed: log.count_action(Action::Failed),
        });

        Ok(GenerateResult {
            log,
            log_path,
            recovered,
        })
    }

    /// Settle every journal an earlier process left behind.
    fn recover_pending(
        &self,
        options: &GenerateOptions,
        mockup_root: &Path,
        events: &dyn RunEventSink,
    ) -> MocksmithResult<Vec<RecoveredRun>> {
        let controller =
            RollbackController::new(&self.file_system, &options.state_dir).guarding(mockup_root);
        let mut recovered = Vec::new();

        for run_id in pending_journals(&self.file_system, &options.state_dir)? {
            let rolled_back = match recover(&controller, &self.ledger, &run_id, events)? {
                Recovery::RolledBack(_) => true,
                Recovery::Finalized => false,
                Recovery::Unknown | Recovery::AlreadyFinalized => continue,
            };
            tracing::warn!(run_id = %run_id, rolled_back, "recovered interrupted run");
            events.on_event(RunEvent::Recovered {
                run_id: run_id.clone(),
                rolled_back,
            });
            recovered.push(RecoveredRun {
                run_id,
                rolled_back,
            });
        }
        Ok(recovered)
    }

    /// A run id no earlier run log or journal uses
    fn next_run_id(&self, state_dir: &Path) -> RunId {
        let mut run_id = RunId::now();
        while self.ledger.run_exists(&run_id)
            || self.file_system.exists(&journal_dir(state_dir, &run_id))
        {
            run_id = run_id.successor();
        }
        run_id
    }

    fn interruption(
        &self,
        options: &GenerateOptions,
        started: Instant,
    ) -> Option<MocksmithError> {
        if options.is_cancelled() {
            return Some(MocksmithError::Cancelled {
                reason: "interrupted".to_string(),
            });
        }
        match options.timeout {
            Some(limit) if started.elapsed() >= limit => Some(MocksmithError::Cancelled {
                reason: format!("timed out after {}s", limit.as_secs()),
            }),
            _ => None,
        }
    }

    fn verify_mockup_tree(&self, prepared: &Prepared, warnings: &mut Vec<String>) -> bool {
        match self.collaborators.source.scan() {
            Ok(rescan) => {
                let drift = rescan.inventory.drift_from(&prepared.scan.inventory);
                if drift.is_empty() {
                    return true;
                }
                let keys: Vec<String> = drift.iter().map(ToString::to_string).collect();
                let warning = format!("mockup tree changed during the run: {}", keys.join(", "));
                tracing::warn!("{}", warning);
                warnings.push(warning);
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not re-scan mockup tree");
                warnings.push(format!("mockup tree could not be re-scanned: {}", e));
                false
            }
        }
    }

    fn clean_staging(&self, state_dir: &Path, staging_dir: &Path) {
        match self.file_system.remove_dir_all(staging_dir) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                tracing::warn!(dir = %staging_dir.display(), error = %e, "staging not removed")
            }
        }
        let _ = self.file_system.remove_dir(&state_dir.join(STAGING_DIR));
    }
}

/// Record for a step the run never reached
fn aborted_record(step: &PlanStep) -> RunRecord {
    let now = Utc::now();
    RunRecord {
        key: step.key.clone(),
        decision: step.decision,
        action: Action::Skipped,
        reason: Some(SkipReason::Aborted),
        started_at: now,
        finished_at: now,
        mockup_fingerprint: step.mockup.as_ref().map(|m| m.fingerprint().clone()),
        artifacts: step.artifacts.iter().map(|a| a.recorded.clone()).collect(),
        errors: Vec::new(),
    }
}
