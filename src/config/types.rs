//! Configuration type definitions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::OutputLayout;
use crate::domain::policies::{GenerationPolicy, SlugRule};
use crate::domain::services::CompositionRules;
use crate::domain::value_objects::EntityKey;
use crate::error::{MocksmithError, MocksmithResult};
use crate::infrastructure::collaborators::DEFAULT_BASE_URL_ENV;

/// Tree locations, relative to the configuration file's directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub mockup_root: PathBuf,
    pub output_root: PathBuf,
    /// Ledger, journals and lock file
    pub state_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mockup_root: PathBuf::from("mockups"),
            output_root: PathBuf::from("."),
            state_dir: PathBuf::from(".mocksmith"),
        }
    }
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Gitignore-style patterns; empty means every file
    pub include: Vec<String>,
    /// Gitignore-style patterns never scanned
    pub skip: Vec<String>,
    pub variant_suffixes: Vec<String>,
    pub composition: CompositionRules,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            skip: Vec::new(),
            variant_suffixes: vec!["mobile".to_string(), "dark".to_string()],
            composition: CompositionRules::default(),
        }
    }
}

/// Run policy defaults; CLI flags extend these
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub allow_update: bool,
    pub only: Vec<String>,
    pub skip: Vec<String>,
    pub allow_orphan_removal: bool,
    /// Force interactive confirmation on or off; unset follows the terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,
}

/// Generated API binding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Environment variable generated bindings read the base URL from
    pub base_url_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url_env: DEFAULT_BASE_URL_ENV.to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub scan: ScanConfig,
    pub generate: GenerateConfig,
    pub outputs: OutputLayout,
    pub api: ApiConfig,
    /// Per-slug rules keyed by selector (`checkout`, `checkout@mobile`)
    pub slugs: BTreeMap<String, SlugRule>,

    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    pub fn mockup_root(&self) -> PathBuf {
        self.resolve(&self.paths.mockup_root)
    }

    pub fn output_root(&self) -> PathBuf {
        self.resolve(&self.paths.output_root)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.resolve(&self.paths.state_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Check selectors and layout before anything runs.
    pub fn validate(&self, source: &Path) -> MocksmithResult<()> {
        let invalid = |message: String| MocksmithError::Config {
            file: source.to_path_buf(),
            message,
        };

        let selectors = self
            .generate
            .only
            .iter()
            .chain(&self.generate.skip)
            .chain(self.slugs.keys());
        for selector in selectors {
            selector
                .parse::<EntityKey>()
                .map_err(|e| invalid(format!("selector '{}': {}", selector, e)))?;
        }

        for (name, dir) in [
            ("outputs.pages_dir", &self.outputs.pages_dir),
            ("outputs.components_dir", &self.outputs.components_dir),
            ("outputs.api_dir", &self.outputs.api_dir),
            ("outputs.route_registry", &self.outputs.route_registry),
        ] {
            crate::domain::services::validate_relative_path(dir.trim_start_matches("./"))
                .map_err(|e| invalid(format!("{}: {}", name, e)))?;
        }

        if self.outputs.extension.is_empty()
            || !self.outputs.extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(invalid(format!(
                "outputs.extension '{}' must be alphanumeric",
                self.outputs.extension
            )));
        }

        if self.mockup_root() == self.output_root() {
            return Err(invalid(
                "paths.mockup_root and paths.output_root must differ".to_string(),
            ));
        }

        Ok(())
    }

    /// Policy for one run, with CLI flags layered over configuration.
    pub fn policy(&self, allow_update: bool, only: &[String]) -> GenerationPolicy {
        let mut selected = self.generate.only.clone();
        for selector in only {
            if !selected.contains(selector) {
                selected.push(selector.clone());
            }
        }
        GenerationPolicy {
            allow_update: allow_update || self.generate.allow_update,
            only: selected,
            skip: self.generate.skip.clone(),
            rules: self.slugs.clone(),
            allow_orphan_removal: self.generate.allow_orphan_removal,
        }
    }
}
