//! Domain Entities
//!
//! - `MockupEntity` - a composed unit of the mockup tree
//! - `OutputArtifact` - a generated unit inside the output tree
//! - `RunRecord` / `RunLog` / `LatestState` - the run ledger

mod artifact;
mod ledger;
mod mockup;

pub use artifact::{
    ArtifactKind, EndpointDescriptor, ObservedArtifact, OutputArtifact, OutputInventory,
    OutputLayout,
};
pub use ledger::{
    Action, Decision, DiscoveryRecord, LatestState, RecordedError, RunLog, RunOptionsRecord,
    RunOutcome, RunRecord, Severity, SkipReason, LEDGER_VERSION,
};
pub use mockup::{MockupEntity, MockupInventory, SourceFile, SourceRole};
