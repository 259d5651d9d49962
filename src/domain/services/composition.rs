//! Mockup composition
//!
//! Groups sibling files sharing a base name into one entity according to the
//! configured composition rules: `checkout.html` + `checkout.css` +
//! `checkout.json` become slug `checkout`. Pure; the scanner supplies the
//! relative paths and reads bytes afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{SourceFile, SourceRole};
use crate::domain::value_objects::{EntityKey, Slug};
use crate::error::{MocksmithError, MocksmithResult};

/// File extensions (lower-case, without dot) per role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionRules {
    pub markup: Vec<String>,
    pub style: Vec<String>,
    pub data: Vec<String>,
    pub image: Vec<String>,
}

impl Default for CompositionRules {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            markup: list(&["html", "htm"]),
            style: list(&["css", "scss"]),
            data: list(&["json"]),
            image: list(&["png", "jpg", "jpeg", "svg", "webp"]),
        }
    }
}

impl CompositionRules {
    pub fn role_for(&self, extension: &str) -> Option<SourceRole> {
        let ext = extension.to_ascii_lowercase();
        let has = |list: &[String]| list.iter().any(|e| e.trim_start_matches('.') == ext);
        if has(&self.markup) {
            Some(SourceRole::Markup)
        } else if has(&self.style) {
            Some(SourceRole::Style)
        } else if has(&self.data) {
            Some(SourceRole::Data)
        } else if has(&self.image) {
            Some(SourceRole::Image)
        } else {
            None
        }
    }
}

/// Files grouped under one key, before fingerprinting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDraft {
    pub key: EntityKey,
    pub files: Vec<SourceFile>,
    /// Variant tags found for a base key
    pub variants: BTreeSet<String>,
}

/// Result of composing one tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    pub drafts: Vec<EntityDraft>,
    /// Files with a known role whose group has no markup
    pub unattached: Vec<String>,
    /// Files with no known role or no usable slug
    pub unrecognized: Vec<String>,
}

/// Group relative paths into entity drafts.
///
/// Fails with `DiscoveryConflict` when two files claim the same singular
/// role for the same key (`Checkout.html` and `checkout.html`, or
/// `home.html` and `home.htm`).
pub fn compose(
    paths: &[String],
    rules: &CompositionRules,
    variant_suffixes: &[String],
) -> MocksmithResult<Composition> {
    let mut sorted: Vec<&String> = paths.iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut groups: BTreeMap<EntityKey, Vec<SourceFile>> = BTreeMap::new();
    let mut composition = Composition::default();

    for path in sorted {
        let Some((stem, extension)) = split_extension(path) else {
            composition.unrecognized.push(path.clone());
            continue;
        };
        let Some(role) = rules.role_for(extension) else {
            composition.unrecognized.push(path.clone());
            continue;
        };
        let Ok(slug) = Slug::normalize(stem) else {
            composition.unrecognized.push(path.clone());
            continue;
        };

        let (base, variant) = slug.split_variant(variant_suffixes);
        let key = match variant {
            Some(tag) => EntityKey::variant(base, tag),
            None => EntityKey::base(base),
        };

        let files = groups.entry(key.clone()).or_default();
        if role.is_singular() {
            if let Some(existing) = files.iter().find(|f| f.role == role) {
                return Err(MocksmithError::DiscoveryConflict {
                    slug: key.to_string(),
                    first: existing.path.clone().into(),
                    second: path.clone().into(),
                    reason: format!("both provide the {:?} source", role).to_lowercase(),
                });
            }
        }
        files.push(SourceFile {
            role,
            path: path.clone(),
        });
    }

    let mut variants_by_base: BTreeMap<EntityKey, BTreeSet<String>> = BTreeMap::new();
    for (key, files) in groups {
        if !files.iter().any(|f| f.role == SourceRole::Markup) {
            composition
                .unattached
                .extend(files.into_iter().map(|f| f.path));
            continue;
        }
        if let Some(tag) = key.variant_tag() {
            variants_by_base
                .entry(EntityKey::base(key.slug().clone()))
                .or_default()
                .insert(tag.to_string());
        }
        composition.drafts.push(EntityDraft {
            key,
            files,
            variants: BTreeSet::new(),
        });
    }

    for draft in &mut composition.drafts {
        if let Some(tags) = variants_by_base.remove(&draft.key) {
            draft.variants = tags;
        }
    }

    composition.unattached.sort();
    Ok(composition)
}

/// `pages/Home.html` → (`pages/Home`, `html`)
fn split_extension(path: &str) -> Option<(&str, &str)> {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let dot = path[file_start..].rfind('.')? + file_start;
    if dot == file_start {
        return None;
    }
    Some((&path[..dot], &path[dot + 1..]))
}
