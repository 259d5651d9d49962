//! Output tree observation
//!
//! Joins the ledger's recorded artifacts with what is on disk in the output
//! tree right now.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::domain::entities::{ArtifactKind, LatestState, ObservedArtifact, OutputInventory};
use crate::domain::ports::FileSystem;
use crate::domain::services::{route_registry, validate_relative_path};
use crate::domain::value_objects::{EntityKey, Fingerprint};
use crate::error::{MocksmithError, MocksmithResult};

/// Output tree scanner
///
/// Ownership comes from the ledger; the disk only says whether each recorded
/// artifact is still there and what it contains now.
pub struct OutputScanner<'a> {
    root: &'a Path,
    fs: &'a dyn FileSystem,
}

impl<'a> OutputScanner<'a> {
    pub fn new(root: &'a Path, fs: &'a dyn FileSystem) -> Self {
        Self { root, fs }
    }

    pub fn scan(&self, latest: &LatestState) -> MocksmithResult<OutputInventory> {
        let mut owners: HashMap<&str, &EntityKey> = HashMap::new();
        let mut registry_cache: Option<Option<String>> = None;
        let mut entries: BTreeMap<EntityKey, Vec<ObservedArtifact>> = BTreeMap::new();

        for (key, artifact) in latest.owned_artifacts() {
            validate_relative_path(&artifact.path).map_err(|message| MocksmithError::Ledger(
                format!("recorded artifact for '{}' has an unsafe path: {}", key, message),
            ))?;

            if !artifact.kind.is_shared() {
                if let Some(other) = owners.insert(artifact.path.as_str(), key) {
                    if other != key {
                        return Err(MocksmithError::DiscoveryConflict {
                            slug: key.to_string(),
                            first: PathBuf::from(&artifact.path),
                            second: PathBuf::from(&artifact.path),
                            reason: format!("output path is also owned by '{}'", other),
                        });
                    }
                }
            }

            let on_disk = match artifact.kind {
                ArtifactKind::Route => {
                    let registry = match &registry_cache {
                        Some(cached) => cached.clone(),
                        None => {
                            let loaded = self.read_optional(&artifact.path)?;
                            registry_cache = Some(loaded.clone());
                            loaded
                        }
                    };
                    registry
                        .as_deref()
                        .and_then(|content| route_registry::entry_for(content, key.slug()))
                        .map(|line| Fingerprint::from_content(&line))
                }
                _ => {
                    let path = self.root.join(&artifact.path);
                    match self.fs.hash(&path) {
                        Ok(fp) => Some(fp),
                        Err(e) if e.is_not_found() => None,
                        Err(e) => {
                            return Err(MocksmithError::Io(std::io::Error::other(e.to_string())))
                        }
                    }
                }
            };

            entries.entry(key.clone()).or_default().push(ObservedArtifact {
                recorded: artifact.clone(),
                on_disk,
            });
        }

        tracing::info!(
            root = %self.root.display(),
            keys = entries.len(),
            "scanned output tree"
        );
        Ok(OutputInventory::new(entries))
    }

    fn read_optional(&self, rel: &str) -> MocksmithResult<Option<String>> {
        match self.fs.read_to_string(&self.root.join(rel)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(MocksmithError::Io(std::io::Error::other(e.to_string()))),
        }
    }
}
