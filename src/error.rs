//! Error types for mocksmith
//!
//! Library errors use `thiserror`; the binary maps them onto exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mocksmith operations
pub type MocksmithResult<T> = Result<T, MocksmithError>;

/// Main error type for mocksmith operations
#[derive(Error, Debug)]
pub enum MocksmithError {
    /// Two distinct mockup files normalize to the same slug with incompatible composition
    #[error("discovery conflict for slug '{slug}': {first} and {second} ({reason})")]
    DiscoveryConflict {
        slug: String,
        first: PathBuf,
        second: PathBuf,
        reason: String,
    },

    /// A single mockup entity could not be parsed
    #[error("failed to parse mockup '{slug}': {message}")]
    Parse { slug: String, message: String },

    /// Candidate generation or validation failed before anything was committed
    #[error("staging failed for '{slug}': {message}")]
    Staging { slug: String, message: String },

    /// An atomic move into the output tree failed after staging
    #[error("commit failed for '{slug}' at {path}: {message}")]
    Commit {
        slug: String,
        path: PathBuf,
        message: String,
    },

    /// A write was attempted without the permission policy grants
    #[error("policy violation for '{slug}': {message}")]
    PolicyViolation { slug: String, message: String },

    /// Configuration could not be loaded or is inconsistent
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Ledger could not be read or written
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Rollback could not restore a recorded prior state
    #[error("rollback of run {run_id} failed at {path}: {message}")]
    Rollback {
        run_id: String,
        path: PathBuf,
        message: String,
    },

    /// Another run holds the output tree lock
    #[error("another run holds the lock at {path}")]
    Locked { path: PathBuf },

    /// The run was interrupted or explicitly aborted
    #[error("run cancelled: {reason}")]
    Cancelled { reason: String },

    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MocksmithError {
    /// Errors that abort the whole run rather than a single slug.
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            MocksmithError::DiscoveryConflict { .. }
                | MocksmithError::Commit { .. }
                | MocksmithError::Cancelled { .. }
                | MocksmithError::Rollback { .. }
                | MocksmithError::Locked { .. }
        )
    }

    /// Short machine-readable kind used in run logs and JSON events
    pub fn kind(&self) -> &'static str {
        match self {
            MocksmithError::DiscoveryConflict { .. } => "discovery-conflict",
            MocksmithError::Parse { .. } => "parse-error",
            MocksmithError::Staging { .. } => "staging-error",
            MocksmithError::Commit { .. } => "commit-error",
            MocksmithError::PolicyViolation { .. } => "policy-violation",
            MocksmithError::Config { .. } => "config-error",
            MocksmithError::Ledger(_) => "ledger-error",
            MocksmithError::Rollback { .. } => "rollback-error",
            MocksmithError::Locked { .. } => "locked",
            MocksmithError::Cancelled { .. } => "cancelled",
            MocksmithError::DirectoryNotFound { .. } => "directory-not-found",
            MocksmithError::Io(_) => "io-error",
        }
    }
}
