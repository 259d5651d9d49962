//! State comparator
//!
//! Classifies every key seen in either inventory. Pure and independent of
//! enumeration order: output is sorted by key.

use std::collections::BTreeSet;

use crate::domain::entities::{
    Action, Decision, LatestState, MockupEntity, MockupInventory, ObservedArtifact,
    OutputInventory,
};
use crate::domain::value_objects::EntityKey;

/// Comparator output for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub key: EntityKey,
    pub decision: Decision,
    pub mockup: Option<MockupEntity>,
    pub artifacts: Vec<ObservedArtifact>,
    /// What the last run did for this key
    pub prior_action: Option<Action>,
}

/// Classify mockups against generated output and the prior ledger.
///
/// - `new`: no recorded artifact is present on disk
/// - `unchanged`: every artifact is present and was generated from the
///   current fingerprint
/// - `update-available`: otherwise (fingerprint drift or a missing artifact)
/// - `orphaned`: artifacts recorded for a key with no mockup
/// - `variant-without-base`: a variant whose base mockup is absent
pub fn compare(
    mockups: &MockupInventory,
    outputs: &OutputInventory,
    prior: &LatestState,
) -> Vec<Classification> {
    let mut keys: BTreeSet<&EntityKey> = mockups.entities().iter().map(|e| e.key()).collect();
    keys.extend(outputs.keys());

    keys.into_iter()
        .filter_map(|key| {
            let mockup = mockups.get(key);
            let artifacts = outputs.artifacts(key);
            let decision = classify(key, mockup, artifacts, mockups)?;
            Some(Classification {
                key: key.clone(),
                decision,
                mockup: mockup.cloned(),
                artifacts: artifacts.to_vec(),
                prior_action: prior.prior(key).map(|r| r.action),
            })
        })
        .collect()
}

fn classify(
    key: &EntityKey,
    mockup: Option<&MockupEntity>,
    artifacts: &[ObservedArtifact],
    mockups: &MockupInventory,
) -> Option<Decision> {
    let Some(mockup) = mockup else {
        return if artifacts.is_empty() {
            None
        } else {
            Some(Decision::Orphaned)
        };
    };

    if key.is_variant() && !mockups.contains(&EntityKey::base(key.slug().clone())) {
        return Some(Decision::VariantWithoutBase);
    }

    if !artifacts.iter().any(ObservedArtifact::is_present) {
        return Some(Decision::New);
    }

    let current = mockup.fingerprint();
    let in_sync = artifacts
        .iter()
        .all(|a| a.is_present() && &a.recorded.generated_from == current);
    if in_sync {
        Some(Decision::Unchanged)
    } else {
        Some(Decision::UpdateAvailable)
    }
}
