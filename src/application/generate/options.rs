//! Generate Options

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{OutputLayout, RunOptionsRecord};
use crate::domain::policies::GenerationPolicy;

/// Options for the generate use case
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root of the generated source tree
    pub output_root: PathBuf,
    /// Ledger, journal and lock directory
    pub state_dir: PathBuf,
    pub layout: OutputLayout,
    pub policy: GenerationPolicy,
    /// Whether confirmations come from a person
    pub interactive: bool,
    /// Cancel between steps once this much time has passed
    pub timeout: Option<Duration>,
    /// Set by the interrupt handler
    pub cancel: Arc<AtomicBool>,
}

impl GenerateOptions {
    pub fn new(output_root: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            state_dir: state_dir.into(),
            layout: OutputLayout::default(),
            policy: GenerationPolicy::default(),
            interactive: false,
            timeout: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// What the run log records about these options
    pub fn record(&self) -> RunOptionsRecord {
        RunOptionsRecord {
            allow_update: self.policy.allow_update,
            only: self.policy.only.clone(),
            interactive: self.interactive,
        }
    }
}
