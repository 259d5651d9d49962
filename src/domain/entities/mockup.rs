//! Mockup entity - one composed unit of the mockup tree
//!
//! Entities are created by the scanner on every run and are never written
//! back. A base entity lists the variant tags discovered next to it; each
//! variant is also its own entity keyed `slug@variant`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntityKey, Fingerprint};

/// What a source file contributes to its entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    Markup,
    Style,
    Data,
    Image,
}

impl SourceRole {
    /// Text roles are fingerprinted with line endings normalized
    pub fn is_text(self) -> bool {
        !matches!(self, SourceRole::Image)
    }

    /// Roles that may appear at most once per entity
    pub fn is_singular(self) -> bool {
        !matches!(self, SourceRole::Image)
    }
}

/// A file belonging to a mockup entity, relative to the mockup root
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceFile {
    pub role: SourceRole,
    /// Forward-slash path relative to the mockup root
    pub path: String,
}

/// A composed mockup unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockupEntity {
    key: EntityKey,
    source_files: Vec<SourceFile>,
    fingerprint: Fingerprint,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    variants: BTreeSet<String>,
}

impl MockupEntity {
    pub fn new(
        key: EntityKey,
        mut source_files: Vec<SourceFile>,
        fingerprint: Fingerprint,
    ) -> Self {
        source_files.sort();
        Self {
            key,
            source_files,
            fingerprint,
            variants: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn variants(&self) -> &BTreeSet<String> {
        &self.variants
    }

    pub fn add_variant(&mut self, tag: impl Into<String>) {
        self.variants.insert(tag.into());
    }

    /// The markup file, if any
    pub fn markup(&self) -> Option<&SourceFile> {
        self.files_with_role(SourceRole::Markup).next()
    }

    pub fn files_with_role(&self, role: SourceRole) -> impl Iterator<Item = &SourceFile> {
        self.source_files.iter().filter(move |f| f.role == role)
    }
}

/// The full, ordered mockup inventory of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockupInventory {
    entities: Vec<MockupEntity>,
}

impl MockupInventory {
    /// Build an inventory; entities are sorted by key.
    pub fn new(mut entities: Vec<MockupEntity>) -> Self {
        entities.sort_by(|a, b| a.key.cmp(&b.key));
        Self { entities }
    }

    pub fn entities(&self) -> &[MockupEntity] {
        &self.entities
    }

    pub fn get(&self, key: &EntityKey) -> Option<&MockupEntity> {
        self.entities
            .binary_search_by(|e| e.key.cmp(key))
            .ok()
            .map(|idx| &self.entities[idx])
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Keys whose fingerprint differs between two scans (added, removed or changed)
    pub fn drift_from(&self, other: &MockupInventory) -> Vec<EntityKey> {
        let mut drift = BTreeSet::new();
        for entity in &self.entities {
            match other.get(&entity.key) {
                Some(o) if o.fingerprint == entity.fingerprint => {}
                _ => {
                    drift.insert(entity.key.clone());
                }
            }
        }
        for entity in &other.entities {
            if !self.contains(&entity.key) {
                drift.insert(entity.key.clone());
            }
        }
        drift.into_iter().collect()
    }
}
