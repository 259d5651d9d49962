//! Configuration module for mocksmith
//!
//! Hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (MOCKSMITH_*)
//! 3. `--config` file, else `mocksmith.toml`, else `agents.config.json`
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    discover, load_with_warnings, with_env_overrides, with_env_overrides_from, ConfigWarning,
    LoadedConfig, CONFIG_FILE_NAMES,
};
pub use types::{ApiConfig, Config, GenerateConfig, PathsConfig, ScanConfig};
