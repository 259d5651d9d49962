//! Generation Policy
//!
//! Decides which keys a run may touch and how. Pure data plus lookups; the
//! planner is the only place these answers turn into steps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{ArtifactKind, EndpointDescriptor};
use crate::domain::value_objects::EntityKey;

/// Per-slug rule, keyed by selector (`checkout` or `checkout@mobile`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugRule {
    /// Generate the page without registering a route
    pub standalone: bool,
    /// Bindings only call external endpoints; no page data fixture is inlined
    pub external_only: bool,
    /// Never plan any write for this slug
    pub skip: bool,
    /// Overrides the global update permission when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_update: Option<bool>,
    /// Restrict generated kinds; empty means the default set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub kinds: Vec<ArtifactKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<EndpointDescriptor>,
}

impl SlugRule {
    /// Whether a kind may be generated under this rule
    pub fn permits_kind(&self, kind: ArtifactKind) -> bool {
        if kind == ArtifactKind::Route && self.standalone {
            return false;
        }
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// Policy for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPolicy {
    pub allow_update: bool,
    /// Selectors restricting the run; empty means everything
    pub only: Vec<String>,
    /// Selectors that are never written
    pub skip: Vec<String>,
    pub rules: BTreeMap<String, SlugRule>,
    pub allow_orphan_removal: bool,
}

impl GenerationPolicy {
    /// Rule for a key: exact selector first, then the base slug.
    pub fn rule_for(&self, key: &EntityKey) -> SlugRule {
        self.rules
            .get(&key.to_string())
            .or_else(|| self.rules.get(key.slug().as_str()))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the `only` filter admits this key
    pub fn in_scope(&self, key: &EntityKey) -> bool {
        self.only.is_empty() || self.explicitly_requested(key)
    }

    /// Whether `only` names this key (or its base)
    pub fn explicitly_requested(&self, key: &EntityKey) -> bool {
        self.only.iter().any(|selector| key.matches_selector(selector))
    }

    pub fn is_skip_listed(&self, key: &EntityKey) -> bool {
        self.skip.iter().any(|selector| key.matches_selector(selector)) || self.rule_for(key).skip
    }

    /// Update permission: per-slug override, else global
    pub fn update_allowed(&self, key: &EntityKey) -> bool {
        self.rule_for(key).allow_update.unwrap_or(self.allow_update)
    }
}
