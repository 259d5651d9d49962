//! Update Confirmation Port
//!
//! Per-file confirmation before an update overwrites generated output.
//! Interactive implementations prompt the user; the default lets the
//! configured policy scope decide.

use crate::domain::value_objects::EntityKey;

/// Why confirmation is being asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// Regenerating from a changed mockup
    Regenerate,
    /// Target was edited by hand since it was generated
    ManualEdit,
    /// Removing output whose mockup is gone
    RemoveOrphan,
}

/// User's choice for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    /// Apply this file
    Apply,
    /// Keep the existing file; the whole step is declined
    Skip,
    /// Show diff between existing and proposed content (caller should loop)
    Diff,
    /// Abort the run and roll back
    Abort,
    /// Apply this and all remaining files
    ApplyAll,
    /// Skip this and all remaining files
    SkipAll,
}

/// Context provided to the confirmation capability
#[derive(Debug, Clone)]
pub struct UpdatePrompt<'a> {
    pub key: &'a EntityKey,
    /// Path relative to the output root
    pub path: &'a str,
    pub reason: UpdateReason,
    pub current: &'a str,
    pub proposed: &'a str,
}

/// Trait for confirming updates.
///
/// Implementations can be:
/// - `InteractiveConfirmation`: prompts via the terminal
/// - `PolicyScopeConfirmation`: the non-interactive default
pub trait UpdateConfirmation: Send + Sync {
    /// Confirm a single file.
    ///
    /// If `ConfirmChoice::Diff` is returned, the caller should call
    /// `show_diff` and then call this again.
    fn confirm(&self, prompt: &UpdatePrompt) -> ConfirmChoice;

    /// Display a diff to the user.
    fn show_diff(&self, diff: &str);
}

/// Non-interactive confirmation: policy scope decides.
///
/// The planner already restricted updates to keys policy permits, so those
/// are applied. Hand-edited files are never overwritten without a human.
pub struct PolicyScopeConfirmation;

impl UpdateConfirmation for PolicyScopeConfirmation {
    fn confirm(&self, prompt: &UpdatePrompt) -> ConfirmChoice {
        match prompt.reason {
            UpdateReason::Regenerate | UpdateReason::RemoveOrphan => ConfirmChoice::Apply,
            UpdateReason::ManualEdit => ConfirmChoice::Skip,
        }
    }

    fn show_diff(&self, _diff: &str) {
        // No-op
    }
}
