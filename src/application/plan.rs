//! Plan Use Case
//!
//! Scanner → output observation → comparator → plan builder. Nothing here
//! writes; `generate` runs the same preparation before executing.

use std::path::Path;

use crate::domain::entities::{LatestState, OutputInventory};
use crate::domain::policies::GenerationPolicy;
use crate::domain::ports::{FileSystem, LedgerRepository, MockupScan, MockupSource};
use crate::domain::services::{build_plan, compare, Plan};
use crate::error::{MocksmithError, MocksmithResult};

use super::output_scan::OutputScanner;

/// Everything one preparation pass observed and decided
#[derive(Debug, Clone)]
pub struct Prepared {
    pub scan: MockupScan,
    pub latest: LatestState,
    pub outputs: OutputInventory,
    pub plan: Plan,
}

impl Prepared {
    /// Scanner findings worth surfacing to the user
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .scan
            .unattached
            .iter()
            .map(|path| format!("{} has no markup file to attach to", path))
            .collect();
        warnings.extend(
            self.scan
                .unrecognized
                .iter()
                .map(|path| format!("{} has an unrecognized extension", path)),
        );
        warnings
    }
}

/// Run the read-only half of the pipeline.
pub fn prepare(
    source: &dyn MockupSource,
    ledger: &dyn LedgerRepository,
    fs: &dyn FileSystem,
    output_root: &Path,
    policy: &GenerationPolicy,
) -> MocksmithResult<Prepared> {
    let scan = source.scan()?;
    tracing::info!(
        root = %source.root().display(),
        entities = scan.inventory.len(),
        "scanned mockup tree"
    );

    let latest = ledger
        .load_latest()
        .map_err(|e| MocksmithError::Ledger(e.to_string()))?;
    let outputs = OutputScanner::new(output_root, fs).scan(&latest)?;
    tracing::info!(keys = outputs.len(), "observed output tree");

    let classifications = compare(&scan.inventory, &outputs, &latest);
    for c in &classifications {
        tracing::debug!(key = %c.key, decision = %c.decision, "classified");
    }

    let plan = build_plan(classifications, policy);
    tracing::info!(
        steps = plan.len(),
        writes = plan.write_count(),
        "plan built"
    );

    Ok(Prepared {
        scan,
        latest,
        outputs,
        plan,
    })
}

/// Plan Use Case
///
/// Shows what `generate` would do without touching the output tree.
pub struct PlanUseCase<LR, FS>
where
    LR: LedgerRepository,
    FS: FileSystem,
{
    ledger: LR,
    file_system: FS,
    source: Box<dyn MockupSource>,
}

impl<LR, FS> PlanUseCase<LR, FS>
where
    LR: LedgerRepository,
    FS: FileSystem,
{
    pub fn new(ledger: LR, file_system: FS, source: Box<dyn MockupSource>) -> Self {
        Self {
            ledger,
            file_system,
            source,
        }
    }

    pub fn execute(
        &self,
        output_root: &Path,
        policy: &GenerationPolicy,
    ) -> MocksmithResult<Prepared> {
        prepare(
            self.source.as_ref(),
            &self.ledger,
            &self.file_system,
            output_root,
            policy,
        )
    }
}
