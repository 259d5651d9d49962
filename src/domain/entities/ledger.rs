//! Run ledger entities
//!
//! Every `generate` run produces one [`RunLog`]: what was discovered, what
//! was decided for each key, and what actually happened. Run logs are never
//! edited after being written. [`LatestState`] is the derived index holding
//! the last [`RunRecord`] per key and is what the next comparator pass reads.
//! It can always be rebuilt by replaying the run logs in order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::OutputArtifact;
use crate::domain::value_objects::{EntityKey, Fingerprint, RunId};
use crate::error::MocksmithError;

/// Current run log / latest-state format version
pub const LEDGER_VERSION: u32 = 1;

/// Comparator classification for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    New,
    Unchanged,
    UpdateAvailable,
    Orphaned,
    VariantWithoutBase,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::New => "new",
            Decision::Unchanged => "unchanged",
            Decision::UpdateAvailable => "update-available",
            Decision::Orphaned => "orphaned",
            Decision::VariantWithoutBase => "variant-without-base",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the run actually did for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Generated,
    Updated,
    Removed,
    Skipped,
    RolledBack,
    Failed,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Generated => "generated",
            Action::Updated => "updated",
            Action::Removed => "removed",
            Action::Skipped => "skipped",
            Action::RolledBack => "rolled-back",
            Action::Failed => "failed",
        }
    }

    /// Whether the action wrote to the output tree
    pub fn is_write(self) -> bool {
        matches!(self, Action::Generated | Action::Updated | Action::Removed)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly a record should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Why a key was reported but not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Generated output already matches the mockup
    UpToDate,
    /// Excluded by the `only` filter
    OutOfScope,
    /// Named in a skip list or a per-slug rule
    SkipListed,
    /// Update available but not permitted by policy
    UpdateNotPermitted,
    /// Output exists without a mockup
    Orphaned,
    /// Variant whose base mockup is missing
    VariantWithoutBase,
    /// Update refused at confirmation
    Declined,
    /// Target was edited by hand since it was generated
    ManualEdit,
    /// Not reached because the run was aborted
    Aborted,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::UpToDate => "up-to-date",
            SkipReason::OutOfScope => "out-of-scope",
            SkipReason::SkipListed => "skip-listed",
            SkipReason::UpdateNotPermitted => "update-not-permitted",
            SkipReason::Orphaned => "orphaned",
            SkipReason::VariantWithoutBase => "variant-without-base",
            SkipReason::Declined => "declined",
            SkipReason::ManualEdit => "manual-edit",
            SkipReason::Aborted => "aborted",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            SkipReason::UpToDate | SkipReason::OutOfScope | SkipReason::SkipListed => {
                Severity::Info
            }
            SkipReason::VariantWithoutBase => Severity::Error,
            SkipReason::UpdateNotPermitted
            | SkipReason::Orphaned
            | SkipReason::Declined
            | SkipReason::ManualEdit
            | SkipReason::Aborted => Severity::Warning,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error captured into a run record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    pub kind: String,
    pub message: String,
}

impl RecordedError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<&MocksmithError> for RecordedError {
    fn from(err: &MocksmithError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// One row per key per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub key: EntityKey,
    pub decision: Decision,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Mockup fingerprint observed in this run, `None` for orphans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mockup_fingerprint: Option<Fingerprint>,
    /// Artifacts owned by this key after the run
    #[serde(default)]
    pub artifacts: Vec<OutputArtifact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RecordedError>,
}

impl RunRecord {
    pub fn severity(&self) -> Severity {
        if !self.errors.is_empty() || self.action == Action::Failed {
            return Severity::Error;
        }
        self.reason.map(SkipReason::severity).unwrap_or(Severity::Info)
    }

    /// A record that downgrades the run's exit status
    pub fn is_problem(&self) -> bool {
        self.severity() >= Severity::Warning
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    Committed,
    RolledBack,
}

/// Options the run was invoked with, kept for audit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptionsRecord {
    pub allow_update: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only: Vec<String>,
    pub interactive: bool,
}

/// A discovered mockup entity as recorded in the run log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub key: EntityKey,
    pub fingerprint: Fingerprint,
    pub sources: Vec<String>,
}

/// The `agent-run-<id>.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLog {
    pub version: u32,
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_cause: Option<RecordedError>,
    pub options: RunOptionsRecord,
    pub discovered: Vec<DiscoveryRecord>,
    pub records: Vec<RunRecord>,
    /// The mockup tree's fingerprints at run end equal those at run start
    pub mockup_tree_verified: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub exit_code: i32,
}

impl RunLog {
    pub fn record(&self, key: &EntityKey) -> Option<&RunRecord> {
        self.records.iter().find(|r| &r.key == key)
    }

    pub fn count_action(&self, action: Action) -> usize {
        self.records.iter().filter(|r| r.action == action).count()
    }
}

/// Derived index: last record per key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestState {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records: BTreeMap<EntityKey, RunRecord>,
}

impl Default for LatestState {
    fn default() -> Self {
        Self {
            version: LEDGER_VERSION,
            last_run: None,
            updated_at: None,
            records: BTreeMap::new(),
        }
    }
}

impl LatestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last record for a key, if any run has seen it
    pub fn prior(&self, key: &EntityKey) -> Option<&RunRecord> {
        self.records.get(key)
    }

    /// Fold one run log into the index
    pub fn apply(&mut self, log: &RunLog) {
        for record in &log.records {
            self.records.insert(record.key.clone(), record.clone());
        }
        self.last_run = Some(log.run_id.clone());
        self.updated_at = Some(log.finished_at);
    }

    /// Rebuild from run logs, in run id order regardless of input order
    pub fn replay(logs: impl IntoIterator<Item = RunLog>) -> Self {
        let mut logs: Vec<RunLog> = logs.into_iter().collect();
        logs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        let mut state = Self::new();
        for log in &logs {
            state.apply(log);
        }
        state
    }

    /// Every (key, artifact) pair currently owned
    pub fn owned_artifacts(&self) -> impl Iterator<Item = (&EntityKey, &OutputArtifact)> {
        self.records
            .iter()
            .flat_map(|(key, record)| record.artifacts.iter().map(move |a| (key, a)))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
