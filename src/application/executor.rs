//! Step executor
//!
//! Runs one plan step at a time: parse, emit, stage, verify, confirm, commit.
//! Per-slug failures (parse, staging, declined confirmation) come back as a
//! failed or skipped `RunRecord`; only run-fatal errors (`Commit`,
//! `Cancelled`) are returned as `Err`, and the caller must roll back.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::entities::{
    Action, ArtifactKind, ObservedArtifact, OutputArtifact, OutputLayout, RecordedError,
    RunRecord, SkipReason,
};
use crate::domain::ports::{
    BindingGenerator, CandidateFile, CodeEmitter, ConfirmChoice, EmitRequest, FileSystem,
    MockupParser, RunEvent, RunEventSink, UpdateConfirmation, UpdatePrompt, UpdateReason,
};
use crate::domain::services::{
    route_registry, validate_candidate, validate_relative_path, PlanStep, StepKind,
};
use crate::domain::value_objects::{EntityKey, Fingerprint};
use crate::error::{MocksmithError, MocksmithResult};

use super::journal::CommitJournal;

/// Everything the executor reads from or writes through
pub struct ExecutionContext<'a> {
    pub fs: &'a dyn FileSystem,
    pub parser: &'a dyn MockupParser,
    pub emitter: &'a dyn CodeEmitter,
    pub bindings: &'a dyn BindingGenerator,
    pub confirmation: &'a dyn UpdateConfirmation,
    pub events: &'a dyn RunEventSink,
    pub layout: &'a OutputLayout,
    pub output_root: &'a Path,
    pub mockup_root: &'a Path,
    /// Per-run scratch directory for staged candidates
    pub staging_dir: PathBuf,
}

/// A candidate written to staging and verified
#[derive(Debug, Clone)]
struct StagedFile {
    kind: ArtifactKind,
    path: String,
    /// Full content the target will have after commit
    content: String,
    /// Fingerprint recorded in the ledger (the registry entry line for routes)
    fingerprint: Fingerprint,
    staged_path: PathBuf,
    current: Option<String>,
}

impl StagedFile {
    fn changed(&self) -> bool {
        self.current.as_deref() != Some(self.content.as_str())
    }
}

/// A removal prepared before anything in the step is committed
enum Retirement {
    Delete(OutputArtifact),
    Rewrite(StagedFile),
}

enum StepDone {
    Written {
        action: Action,
        artifacts: Vec<OutputArtifact>,
    },
    Skipped {
        reason: SkipReason,
        error: Option<MocksmithError>,
    },
}

pub struct Executor<'a> {
    ctx: ExecutionContext<'a>,
    journal: CommitJournal<'a>,
    /// Non-shared output paths and the key owning each
    owners: HashMap<String, EntityKey>,
    /// Registry content as of the last commit in this run; `None` until read
    registry: Option<Option<String>>,
    committed: usize,
}

impl<'a> Executor<'a> {
    pub fn new(
        ctx: ExecutionContext<'a>,
        journal: CommitJournal<'a>,
        owned: impl IntoIterator<Item = (EntityKey, OutputArtifact)>,
    ) -> Self {
        let owners = owned
            .into_iter()
            .filter(|(_, a)| !a.kind.is_shared())
            .map(|(key, a)| (a.path, key))
            .collect();
        Self {
            ctx,
            journal,
            owners,
            registry: None,
            committed: 0,
        }
    }

    /// Number of files moved into place or removed so far
    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn into_journal(self) -> CommitJournal<'a> {
        self.journal
    }

    /// Execute one step.
    ///
    /// Returns `Err` only for run-fatal errors; everything else is recorded.
    pub fn execute(&mut self, index: usize, step: &PlanStep) -> MocksmithResult<RunRecord> {
        let started_at = Utc::now();
        if self.ctx.events.wants_detailed_events() {
            self.ctx.events.on_event(RunEvent::StepStarted {
                index,
                key: step.key.clone(),
                kind: step.kind,
            });
        }

        let prior: Vec<OutputArtifact> =
            step.artifacts.iter().map(|a| a.recorded.clone()).collect();
        let mut record = RunRecord {
            key: step.key.clone(),
            decision: step.decision,
            action: Action::Skipped,
            reason: step.reason,
            started_at,
            finished_at: started_at,
            mockup_fingerprint: step.mockup.as_ref().map(|m| m.fingerprint().clone()),
            artifacts: prior,
            errors: Vec::new(),
        };

        let committed_before = self.committed;
        let outcome = match step.kind {
            StepKind::ReportOnly => Ok(StepDone::Skipped {
                reason: step.reason.unwrap_or(SkipReason::OutOfScope),
                error: step.violation.as_ref().map(|message| MocksmithError::PolicyViolation {
                    slug: step.key.to_string(),
                    message: message.clone(),
                }),
            }),
            StepKind::Generate | StepKind::Update => self.write_step(index, step),
            StepKind::Remove => self.remove_step(index, step),
        };

        match outcome {
            Ok(StepDone::Written { action, artifacts }) => {
                record.action = action;
                record.reason = None;
                record.artifacts = artifacts;
            }
            Ok(StepDone::Skipped { reason, error }) => {
                record.action = Action::Skipped;
                record.reason = Some(reason);
                if let Some(err) = error {
                    tracing::warn!(key = %step.key, error = %err, "step not executed");
                    record.errors.push(RecordedError::from(&err));
                }
            }
            Err(err) if err.is_run_fatal() => return Err(err),
            Err(err) if self.committed != committed_before => {
                // Files of this step are already committed.
                return Err(MocksmithError::Commit {
                    slug: step.key.to_string(),
                    path: self.ctx.output_root.to_path_buf(),
                    message: format!("step failed after committing files: {}", err),
                });
            }
            Err(err) => {
                tracing::warn!(key = %step.key, error = %err, "step failed");
                self.ctx.events.on_event(RunEvent::StepFailed {
                    index,
                    key: step.key.clone(),
                    error: err.to_string(),
                });
                record.action = Action::Failed;
                record.reason = None;
                record.errors.push(RecordedError::from(&err));
            }
        }

        record.finished_at = Utc::now();
        tracing::debug!(key = %record.key, action = %record.action, "step finished");
        self.ctx.events.on_event(RunEvent::StepFinished {
            index,
            key: record.key.clone(),
            action: record.action,
            reason: record.reason,
        });
        Ok(record)
    }

    fn write_step(&mut self, index: usize, step: &PlanStep) -> MocksmithResult<StepDone> {
        let key = &step.key;
        let mockup = step.mockup.as_ref().ok_or_else(|| MocksmithError::Staging {
            slug: key.to_string(),
            message: "no mockup entity for a write step".to_string(),
        })?;

        let tree = self
            .ctx
            .parser
            .parse(mockup)
            .map_err(|e| MocksmithError::Parse {
                slug: key.to_string(),
                message: e.to_string(),
            })?;

        let request = EmitRequest {
            key,
            rule: &step.rule,
            layout: self.ctx.layout,
        };
        let mut candidates = self.ctx.emitter.emit(&tree, &request);
        candidates.extend(self.ctx.bindings.generate(&step.rule.endpoints, &request));
        if candidates.is_empty() {
            return Err(staging(key, "no files were generated"));
        }

        let staged = self.stage(index, key, candidates)?;

        let stale: Vec<&ObservedArtifact> = step
            .artifacts
            .iter()
            .filter(|a| !staged.iter().any(|s| s.path == a.recorded.path))
            .collect();
        let (kept, retirements) = self.prepare_retirement(index, key, &stale)?;

        if step.kind == StepKind::Update {
            if let Some(done) = self.confirm_update(key, &staged, &step.artifacts)? {
                return Ok(done);
            }
        }

        for file in staged.iter().filter(|f| f.changed()) {
            self.commit_staged(index, key, file)?;
        }
        for retirement in &retirements {
            self.retire(index, key, retirement)?;
        }

        let mut artifacts: Vec<OutputArtifact> = staged
            .iter()
            .map(|file| OutputArtifact {
                kind: file.kind,
                path: file.path.clone(),
                content_fingerprint: file.fingerprint.clone(),
                generated_from: mockup.fingerprint().clone(),
                standalone: step.rule.standalone,
                external_only: step.rule.external_only,
            })
            .collect();
        artifacts.extend(kept);
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));

        let action = match step.kind {
            StepKind::Generate => Action::Generated,
            _ => Action::Updated,
        };
        tracing::info!(key = %key, action = %action, files = artifacts.len(), "step committed");
        Ok(StepDone::Written { action, artifacts })
    }

    fn remove_step(&mut self, index: usize, step: &PlanStep) -> MocksmithResult<StepDone> {
        let key = &step.key;
        let present: Vec<&ObservedArtifact> =
            step.artifacts.iter().filter(|a| a.is_present()).collect();

        for artifact in &present {
            let path = &artifact.recorded.path;
            self.guard_target(key, path)?;
            let current = self.read_current(key, path)?;
            let proposed = if artifact.recorded.kind.is_shared() {
                route_registry::merge(current.as_deref(), key.slug(), None)
                    .map_err(|e| staging(key, &e))?
            } else {
                String::new()
            };
            let reason = if artifact.is_modified() {
                UpdateReason::ManualEdit
            } else {
                UpdateReason::RemoveOrphan
            };
            let current = current.as_deref().unwrap_or("");
            if let Some(done) = self.ask(key, path, reason, current, &proposed)? {
                return Ok(done);
            }
        }

        let mut retirements = Vec::with_capacity(present.len());
        for artifact in &present {
            retirements.extend(self.prepare_removal(index, key, &artifact.recorded)?);
        }
        for retirement in &retirements {
            self.retire(index, key, retirement)?;
        }
        tracing::info!(key = %key, files = present.len(), "orphan removed");
        Ok(StepDone::Written {
            action: Action::Removed,
            artifacts: Vec::new(),
        })
    }

    /// Write every candidate to staging and verify it.
    fn stage(
        &mut self,
        index: usize,
        key: &EntityKey,
        candidates: Vec<CandidateFile>,
    ) -> MocksmithResult<Vec<StagedFile>> {
        let step_dir = self.ctx.staging_dir.join(format!("{:04}", index));
        let registry_path = self.ctx.layout.registry_path();
        let mut seen = HashSet::new();
        let mut staged = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            validate_relative_path(&candidate.path).map_err(|e| staging(key, &e))?;
            if !seen.insert(candidate.path.clone()) {
                return Err(staging(key, &format!("{} was emitted twice", candidate.path)));
            }
            self.guard_target(key, &candidate.path)?;

            let (content, fingerprint, current) = if candidate.kind.is_shared() {
                if candidate.path != registry_path {
                    return Err(staging(
                        key,
                        &format!(
                            "route entry targets {} instead of {}",
                            candidate.path, registry_path
                        ),
                    ));
                }
                let current = self.registry_content(key)?;
                let merged =
                    route_registry::merge(current.as_deref(), key.slug(), Some(&candidate.content))
                        .map_err(|e| staging(key, &e))?;
                (merged, Fingerprint::from_content(&candidate.content), current)
            } else {
                match self.owners.get(&candidate.path) {
                    Some(owner) if owner != key => {
                        return Err(staging(
                            key,
                            &format!("{} is owned by '{}'", candidate.path, owner),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        if self.ctx.fs.exists(&self.ctx.output_root.join(&candidate.path)) {
                            return Err(staging(
                                key,
                                &format!(
                                    "{} exists and is not managed by mocksmith",
                                    candidate.path
                                ),
                            ));
                        }
                    }
                }
                let current = self.read_current(key, &candidate.path)?;
                let fingerprint = Fingerprint::from_content(&candidate.content);
                (candidate.content, fingerprint, current)
            };

            validate_candidate(&candidate.path, &content)
                .map_err(|e| staging(key, &format!("{}: {}", candidate.path, e)))?;

            let staged_path = step_dir.join(&candidate.path);
            self.ctx
                .fs
                .write(&staged_path, content.as_bytes())
                .map_err(|e| staging(key, &format!("cannot stage {}: {}", candidate.path, e)))?;

            staged.push(StagedFile {
                kind: candidate.kind,
                path: candidate.path,
                content,
                fingerprint,
                staged_path,
                current,
            });
        }

        // Shared registry last, after the files it points at.
        staged.sort_by_key(|f| f.kind.is_shared());
        Ok(staged)
    }

    /// Per-file confirmation for an update. `Some` means the step stops here.
    fn confirm_update(
        &self,
        key: &EntityKey,
        staged: &[StagedFile],
        observed: &[ObservedArtifact],
    ) -> MocksmithResult<Option<StepDone>> {
        for file in staged.iter().filter(|f| f.changed()) {
            let modified = observed
                .iter()
                .any(|a| a.recorded.path == file.path && a.is_modified());
            let reason = if modified {
                UpdateReason::ManualEdit
            } else {
                UpdateReason::Regenerate
            };
            let current = file.current.as_deref().unwrap_or("");
            if let Some(done) = self.ask(key, &file.path, reason, current, &file.content)? {
                return Ok(Some(done));
            }
        }
        Ok(None)
    }

    fn ask(
        &self,
        key: &EntityKey,
        path: &str,
        reason: UpdateReason,
        current: &str,
        proposed: &str,
    ) -> MocksmithResult<Option<StepDone>> {
        let prompt = UpdatePrompt {
            key,
            path,
            reason,
            current,
            proposed,
        };
        loop {
            match self.ctx.confirmation.confirm(&prompt) {
                ConfirmChoice::Apply | ConfirmChoice::ApplyAll => return Ok(None),
                ConfirmChoice::Diff => {
                    self.ctx
                        .confirmation
                        .show_diff(&generate_diff(path, current, proposed));
                }
                ConfirmChoice::Skip | ConfirmChoice::SkipAll => {
                    let done = if reason == UpdateReason::ManualEdit {
                        StepDone::Skipped {
                            reason: SkipReason::ManualEdit,
                            error: Some(MocksmithError::PolicyViolation {
                                slug: key.to_string(),
                                message: format!("{} was edited by hand; not overwritten", path),
                            }),
                        }
                    } else {
                        StepDone::Skipped {
                            reason: SkipReason::Declined,
                            error: None,
                        }
                    };
                    return Ok(Some(done));
                }
                ConfirmChoice::Abort => {
                    return Err(MocksmithError::Cancelled {
                        reason: format!("aborted while confirming {}", path),
                    })
                }
            }
        }
    }

    fn commit_staged(
        &mut self,
        index: usize,
        key: &EntityKey,
        file: &StagedFile,
    ) -> MocksmithResult<()> {
        self.journal.record_prior(&file.path).map_err(|e| with_slug(e, key))?;
        let target = self.ctx.output_root.join(&file.path);
        self.ctx
            .fs
            .rename(&file.staged_path, &target)
            .map_err(|e| MocksmithError::Commit {
                slug: key.to_string(),
                path: PathBuf::from(&file.path),
                message: e.to_string(),
            })?;

        if file.kind.is_shared() {
            self.registry = Some(Some(file.content.clone()));
        } else {
            self.owners.insert(file.path.clone(), key.clone());
        }
        self.committed += 1;
        tracing::info!(key = %key, path = %file.path, "committed");
        if self.ctx.events.wants_detailed_events() {
            self.ctx.events.on_event(RunEvent::FileCommitted {
                index,
                key: key.clone(),
                kind: file.kind,
                path: file.path.clone(),
            });
        }
        Ok(())
    }

    /// Stage the removal of artifacts the key no longer produces. Hand-edited
    /// ones are kept and returned.
    fn prepare_retirement(
        &mut self,
        index: usize,
        key: &EntityKey,
        stale: &[&ObservedArtifact],
    ) -> MocksmithResult<(Vec<OutputArtifact>, Vec<Retirement>)> {
        let mut kept = Vec::new();
        let mut retirements = Vec::new();
        for artifact in stale {
            if !artifact.is_present() {
                continue;
            }
            if artifact.is_modified() {
                tracing::warn!(
                    key = %key,
                    path = %artifact.recorded.path,
                    "keeping hand-edited artifact"
                );
                kept.push(artifact.recorded.clone());
                continue;
            }
            retirements.extend(self.prepare_removal(index, key, &artifact.recorded)?);
        }
        Ok((kept, retirements))
    }

    /// `None` when the registry already lacks the key's entry.
    fn prepare_removal(
        &mut self,
        index: usize,
        key: &EntityKey,
        artifact: &OutputArtifact,
    ) -> MocksmithResult<Option<Retirement>> {
        self.guard_target(key, &artifact.path)?;
        if !artifact.kind.is_shared() {
            return Ok(Some(Retirement::Delete(artifact.clone())));
        }

        let current = self.registry_content(key)?;
        let content = route_registry::merge(current.as_deref(), key.slug(), None)
            .map_err(|e| staging(key, &e))?;
        let staged_path = self
            .ctx
            .staging_dir
            .join(format!("{:04}", index))
            .join(&artifact.path);
        self.ctx
            .fs
            .write(&staged_path, content.as_bytes())
            .map_err(|e| staging(key, &format!("cannot stage {}: {}", artifact.path, e)))?;
        let file = StagedFile {
            kind: artifact.kind,
            path: artifact.path.clone(),
            fingerprint: Fingerprint::from_content(&content),
            content,
            staged_path,
            current,
        };
        Ok(file.changed().then_some(Retirement::Rewrite(file)))
    }

    fn retire(
        &mut self,
        index: usize,
        key: &EntityKey,
        retirement: &Retirement,
    ) -> MocksmithResult<()> {
        let artifact = match retirement {
            Retirement::Rewrite(file) => return self.commit_staged(index, key, file),
            Retirement::Delete(artifact) => artifact,
        };

        self.journal
            .record_prior(&artifact.path)
            .map_err(|e| with_slug(e, key))?;
        let target = self.ctx.output_root.join(&artifact.path);
        match self.ctx.fs.remove(&target) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                return Err(MocksmithError::Commit {
                    slug: key.to_string(),
                    path: PathBuf::from(&artifact.path),
                    message: e.to_string(),
                })
            }
        }
        self.owners.remove(&artifact.path);
        self.committed += 1;
        tracing::info!(key = %key, path = %artifact.path, "removed");
        Ok(())
    }

    fn guard_target(&self, key: &EntityKey, rel_path: &str) -> MocksmithResult<()> {
        let target = self.ctx.output_root.join(rel_path);
        if target.starts_with(self.ctx.mockup_root) {
            return Err(MocksmithError::PolicyViolation {
                slug: key.to_string(),
                message: format!("{} is inside the mockup tree", rel_path),
            });
        }
        Ok(())
    }

    fn registry_content(&mut self, key: &EntityKey) -> MocksmithResult<Option<String>> {
        if let Some(cached) = &self.registry {
            return Ok(cached.clone());
        }
        let loaded = self.read_current(key, &self.ctx.layout.registry_path())?;
        self.registry = Some(loaded.clone());
        Ok(loaded)
    }

    fn read_current(&self, key: &EntityKey, rel_path: &str) -> MocksmithResult<Option<String>> {
        match self.ctx.fs.read_to_string(&self.ctx.output_root.join(rel_path)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(staging(key, &format!("cannot read {}: {}", rel_path, e))),
        }
    }
}

fn staging(key: &EntityKey, message: &str) -> MocksmithError {
    MocksmithError::Staging {
        slug: key.to_string(),
        message: message.to_string(),
    }
}

fn with_slug(err: MocksmithError, key: &EntityKey) -> MocksmithError {
    match err {
        MocksmithError::Commit { path, message, .. } => MocksmithError::Commit {
            slug: key.to_string(),
            path,
            message,
        },
        other => other,
    }
}

/// Unified diff between old and new content
fn generate_diff(path: &str, old: &str, new: &str) -> String {
    use similar::TextDiff;
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&format!("a/{}", path), &format!("b/{}", path))
        .to_string()
}
