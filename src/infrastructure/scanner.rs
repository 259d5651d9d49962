//! Mockup tree scanner
//!
//! Walks the mockup tree (read-only), applies include/skip rules and composes
//! sibling files into entities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::{MockupEntity, MockupInventory, SourceFile};
use crate::domain::ports::{MockupScan, MockupSource};
use crate::domain::services::{compose, CompositionRules};
use crate::domain::value_objects::{Fingerprint, FingerprintBuilder, PathRules};
use crate::error::{MocksmithError, MocksmithResult};

/// Mockup tree scanner
pub struct FsMockupScanner {
    root: PathBuf,
    rules: PathRules,
    composition: CompositionRules,
    variant_suffixes: Vec<String>,
}

impl FsMockupScanner {
    pub fn new(
        root: impl Into<PathBuf>,
        rules: PathRules,
        composition: CompositionRules,
        variant_suffixes: Vec<String>,
    ) -> Self {
        Self {
            root: root.into(),
            rules,
            composition,
            variant_suffixes,
        }
    }

    fn walk_all(&self) -> MocksmithResult<MockupScan> {
        if !self.root.is_dir() {
            return Err(MocksmithError::DirectoryNotFound {
                path: self.root.clone(),
            });
        }

        let mut paths = Vec::new();
        self.walk(&self.root, &mut paths)?;
        paths.sort();

        let composition = compose(&paths, &self.composition, &self.variant_suffixes)?;

        let mut entities = Vec::with_capacity(composition.drafts.len());
        for draft in composition.drafts {
            let fingerprint = self.fingerprint(&draft.files)?;
            let mut entity = MockupEntity::new(draft.key, draft.files, fingerprint);
            for tag in draft.variants {
                entity.add_variant(tag);
            }
            entities.push(entity);
        }

        let inventory = MockupInventory::new(entities);
        tracing::info!(
            root = %self.root.display(),
            entities = inventory.len(),
            unattached = composition.unattached.len(),
            "scanned mockup tree"
        );
        for path in &composition.unattached {
            tracing::warn!(path = %path, "mockup file has no markup sibling; ignored");
        }

        Ok(MockupScan {
            inventory,
            unattached: composition.unattached,
            unrecognized: composition.unrecognized,
        })
    }

    fn walk(&self, current: &Path, out: &mut Vec<String>) -> MocksmithResult<()> {
        for entry in fs::read_dir(current)? {
            let entry = entry?;
            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let hidden = entry
                .file_name()
                .to_str()
                .map(|n| n.starts_with('.'))
                .unwrap_or(true);
            if hidden {
                continue;
            }

            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if self.rules.allows_dir(relative) {
                    self.walk(&path, out)?;
                }
            } else if file_type.is_file() && self.rules.allows_file(relative) {
                if let Some(rel) = relative.to_str() {
                    out.push(rel.replace('\\', "/"));
                } else {
                    tracing::warn!(path = %path.display(), "skipping non UTF-8 path");
                }
            }
        }
        Ok(())
    }

    /// Fingerprint over (path, normalized bytes) of each source, in order.
    fn fingerprint(&self, files: &[SourceFile]) -> MocksmithResult<Fingerprint> {
        let mut builder = FingerprintBuilder::new();
        for file in files {
            let bytes = fs::read(self.root.join(&file.path))?;
            let name = file.path.to_lowercase();
            if file.role.is_text() {
                let normalized = normalize_line_endings(&bytes);
                builder.part(&name, &normalized);
            } else {
                builder.part(&name, &bytes);
            }
        }
        Ok(builder.finish())
    }
}

impl MockupSource for FsMockupScanner {
    fn root(&self) -> &Path {
        &self.root
    }

    /// Walk, compose and fingerprint. Never writes.
    fn scan(&self) -> MocksmithResult<MockupScan> {
        self.walk_all()
    }
}

fn normalize_line_endings(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}
