//! Plan builder
//!
//! Turns comparator classifications into an ordered, side-effect-free plan.
//! The plan alone is what `plan` prints and what `generate` executes.

use std::fmt;

use crate::domain::entities::{Decision, MockupEntity, ObservedArtifact, Severity, SkipReason};
use crate::domain::policies::{GenerationPolicy, SlugRule};
use crate::domain::services::comparator::Classification;
use crate::domain::value_objects::EntityKey;

/// What a step will do
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepKind {
    Generate,
    Update,
    Remove,
    ReportOnly,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Generate => "generate",
            StepKind::Update => "update",
            StepKind::Remove => "remove",
            StepKind::ReportOnly => "report-only",
        }
    }

    pub fn writes(self) -> bool {
        !matches!(self, StepKind::ReportOnly)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub key: EntityKey,
    pub kind: StepKind,
    pub decision: Decision,
    /// Set for report-only steps
    pub reason: Option<SkipReason>,
    /// Set when the step was explicitly requested but policy forbids it
    pub violation: Option<String>,
    pub mockup: Option<MockupEntity>,
    pub artifacts: Vec<ObservedArtifact>,
    pub rule: SlugRule,
}

impl PlanStep {
    pub fn severity(&self) -> Severity {
        if self.violation.is_some() {
            return Severity::Error;
        }
        self.reason.map(SkipReason::severity).unwrap_or(Severity::Info)
    }
}

/// Ordered execution plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<PlanStep> {
        self.steps
    }

    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }

    /// Steps that will write to the output tree
    pub fn write_count(&self) -> usize {
        self.steps.iter().filter(|s| s.kind.writes()).count()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Build the plan for a set of classifications under a policy.
///
/// Order: generate, update, remove, report-only; lexicographic by key within
/// each class.
pub fn build_plan(classifications: Vec<Classification>, policy: &GenerationPolicy) -> Plan {
    let mut steps: Vec<PlanStep> = classifications
        .into_iter()
        .map(|c| plan_one(c, policy))
        .collect();
    steps.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.key.cmp(&b.key)));
    Plan { steps }
}

fn plan_one(c: Classification, policy: &GenerationPolicy) -> PlanStep {
    let rule = policy.rule_for(&c.key);
    let mut violation = None;

    let (kind, reason) = if !policy.in_scope(&c.key) {
        (StepKind::ReportOnly, Some(SkipReason::OutOfScope))
    } else {
        match c.decision {
            Decision::VariantWithoutBase => {
                (StepKind::ReportOnly, Some(SkipReason::VariantWithoutBase))
            }
            Decision::Orphaned => {
                if policy.allow_orphan_removal && !policy.is_skip_listed(&c.key) {
                    (StepKind::Remove, None)
                } else {
                    (StepKind::ReportOnly, Some(SkipReason::Orphaned))
                }
            }
            _ if policy.is_skip_listed(&c.key) => {
                (StepKind::ReportOnly, Some(SkipReason::SkipListed))
            }
            Decision::New => (StepKind::Generate, None),
            // Under an `only` filter nothing unchanged is in the requested scope of work.
            Decision::Unchanged if !policy.only.is_empty() => {
                (StepKind::ReportOnly, Some(SkipReason::OutOfScope))
            }
            Decision::Unchanged => (StepKind::ReportOnly, Some(SkipReason::UpToDate)),
            Decision::UpdateAvailable => {
                if policy.update_allowed(&c.key) {
                    (StepKind::Update, None)
                } else {
                    if policy.explicitly_requested(&c.key) {
                        violation = Some(format!(
                            "'{}' was requested but updates are not permitted for it",
                            c.key
                        ));
                    }
                    (StepKind::ReportOnly, Some(SkipReason::UpdateNotPermitted))
                }
            }
        }
    };

    PlanStep {
        key: c.key,
        kind,
        decision: c.decision,
        reason,
        violation,
        mockup: c.mockup,
        artifacts: c.artifacts,
        rule,
    }
}
