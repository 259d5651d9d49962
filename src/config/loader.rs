//! Configuration discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MocksmithError, MocksmithResult};

use super::types::Config;

/// Files looked up in the working directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["mocksmith.toml", "agents.config.json"];

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// A configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// `None` when running on defaults
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Find and load configuration for a working directory.
///
/// An explicit path must exist. Without one, the first of
/// `CONFIG_FILE_NAMES` present in `cwd` is used, else defaults.
pub fn discover(cwd: &Path, explicit: Option<&Path>) -> MocksmithResult<LoadedConfig> {
    let path = match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            if !path.is_file() {
                return Err(MocksmithError::Config {
                    file: path,
                    message: "configuration file not found".to_string(),
                });
            }
            Some(path)
        }
        None => CONFIG_FILE_NAMES
            .iter()
            .map(|name| cwd.join(name))
            .find(|p| p.is_file()),
    };

    let Some(path) = path else {
        let config = Config {
            base_dir: cwd.to_path_buf(),
            ..Config::default()
        };
        let config = with_env_overrides(config);
        config.validate(cwd)?;
        return Ok(LoadedConfig {
            config,
            source: None,
            warnings: Vec::new(),
        });
    };

    let (mut config, warnings) = load_with_warnings(&path)?;
    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());
    let config = with_env_overrides(config);
    config.validate(&path)?;
    tracing::debug!(path = %path.display(), warnings = warnings.len(), "configuration loaded");

    Ok(LoadedConfig {
        config,
        source: Some(path),
        warnings,
    })
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
///
/// The format follows the extension: `.json` is JSON, anything else TOML.
pub fn load_with_warnings(path: &Path) -> MocksmithResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    let invalid = |message: String| MocksmithError::Config {
        file: path.to_path_buf(),
        message,
    };

    let mut unknown_paths: Vec<String> = Vec::new();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: Config = if is_json {
        let mut deserializer = serde_json::Deserializer::from_str(&content);
        serde_ignored::deserialize(&mut deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| invalid(e.to_string()))?
    } else {
        let deserializer = toml::de::Deserializer::new(&content);
        serde_ignored::deserialize(deserializer, |p| {
            unknown_paths.push(p.to_string());
        })
        .map_err(|e| invalid(e.to_string()))?
    };

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Apply environment variable overrides (MOCKSMITH_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_env_overrides_from(config, |name| std::env::var(name).ok())
}

/// Apply overrides from an arbitrary variable lookup
pub fn with_env_overrides_from(
    mut config: Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Config {
    if let Some(root) = lookup("MOCKSMITH_MOCKUP_ROOT").filter(|v| !v.is_empty()) {
        config.paths.mockup_root = PathBuf::from(root);
    }
    if let Some(root) = lookup("MOCKSMITH_OUTPUT_ROOT").filter(|v| !v.is_empty()) {
        config.paths.output_root = PathBuf::from(root);
    }
    if let Some(dir) = lookup("MOCKSMITH_STATE_DIR").filter(|v| !v.is_empty()) {
        config.paths.state_dir = PathBuf::from(dir);
    }
    if let Some(val) = lookup("MOCKSMITH_ALLOW_UPDATE") {
        match val.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => config.generate.allow_update = true,
            "0" | "false" | "no" | "off" | "" => config.generate.allow_update = false,
            other => tracing::warn!(value = other, "ignoring invalid MOCKSMITH_ALLOW_UPDATE"),
        }
    }
    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "paths",
        "mockup_root",
        "output_root",
        "state_dir",
        "scan",
        "include",
        "skip",
        "variant_suffixes",
        "composition",
        "markup",
        "style",
        "data",
        "image",
        "generate",
        "allow_update",
        "only",
        "allow_orphan_removal",
        "interactive",
        "outputs",
        "pages_dir",
        "components_dir",
        "api_dir",
        "route_registry",
        "extension",
        "api",
        "base_url_env",
        "slugs",
        "standalone",
        "external_only",
        "kinds",
        "endpoints",
        "method",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
