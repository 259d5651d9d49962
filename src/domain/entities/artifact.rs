//! Output artifacts - generated units inside the output tree
//!
//! Artifacts are created by the executor and recorded in the ledger. The
//! ledger, not the output tree, is the source of truth for ownership: a file
//! is ours only if a ledger record names it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{pascal_case, EntityKey, Fingerprint, Slug};

/// Kind of generated unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Page,
    Component,
    Route,
    ApiBinding,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Page => "page",
            ArtifactKind::Component => "component",
            ArtifactKind::Route => "route",
            ArtifactKind::ApiBinding => "api-binding",
        }
    }

    /// Route entries live in a shared registry file rather than a file of their own
    pub fn is_shared(self) -> bool {
        matches!(self, ArtifactKind::Route)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated unit as recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub kind: ArtifactKind,
    /// Forward-slash path relative to the output root
    pub path: String,
    /// Fingerprint of what was written (for routes: the registry entry line)
    pub content_fingerprint: Fingerprint,
    /// Mockup fingerprint this artifact was generated from
    pub generated_from: Fingerprint,
    #[serde(default)]
    pub standalone: bool,
    #[serde(default)]
    pub external_only: bool,
}

/// A recorded artifact together with what is on disk right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedArtifact {
    pub recorded: OutputArtifact,
    /// Current fingerprint of the target, `None` if it is missing
    pub on_disk: Option<Fingerprint>,
}

impl ObservedArtifact {
    pub fn is_present(&self) -> bool {
        self.on_disk.is_some()
    }

    /// Present but different from what was written
    pub fn is_modified(&self) -> bool {
        matches!(&self.on_disk, Some(fp) if *fp != self.recorded.content_fingerprint)
    }
}

/// Output-tree inventory: ledger-owned artifacts joined with the disk state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputInventory {
    entries: BTreeMap<EntityKey, Vec<ObservedArtifact>>,
}

impl OutputInventory {
    pub fn new(entries: BTreeMap<EntityKey, Vec<ObservedArtifact>>) -> Self {
        Self { entries }
    }

    pub fn artifacts(&self, key: &EntityKey) -> &[ObservedArtifact] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An API endpoint a generated binding should call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Where each artifact kind lands inside the output root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    pub pages_dir: String,
    pub components_dir: String,
    pub api_dir: String,
    pub route_registry: String,
    pub extension: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            pages_dir: "src/pages".to_string(),
            components_dir: "src/components".to_string(),
            api_dir: "src/api".to_string(),
            route_registry: "src/routes.generated.ts".to_string(),
            extension: "tsx".to_string(),
        }
    }
}

impl OutputLayout {
    pub fn page_path(&self, slug: &Slug) -> String {
        format!(
            "{}/{}/{}Page.{}",
            trim_dir(&self.pages_dir),
            slug,
            slug.pascal_case(),
            self.extension
        )
    }

    pub fn variant_path(&self, slug: &Slug, variant: &str) -> String {
        format!(
            "{}/{}/{}{}.{}",
            trim_dir(&self.components_dir),
            slug,
            slug.pascal_case(),
            pascal_case(variant),
            self.extension
        )
    }

    pub fn section_path(&self, slug: &Slug, component: &str) -> String {
        format!(
            "{}/{}/{}.{}",
            trim_dir(&self.components_dir),
            slug,
            pascal_case(component),
            self.extension
        )
    }

    pub fn api_path(&self, slug: &Slug) -> String {
        format!("{}/{}.ts", trim_dir(&self.api_dir), slug)
    }

    pub fn registry_path(&self) -> String {
        self.route_registry.trim_start_matches("./").to_string()
    }
}

fn trim_dir(dir: &str) -> &str {
    dir.trim_start_matches("./").trim_end_matches('/')
}
