//! Interactive Update Confirmation
//!
//! Prompts on the terminal before each update is committed.

use std::sync::Mutex;

use dialoguer::Select;

use crate::domain::ports::{ConfirmChoice, UpdateConfirmation, UpdatePrompt, UpdateReason};

const ITEMS: &[&str] = &[
    "apply",
    "skip",
    "show diff",
    "abort run (roll back)",
    "apply all remaining",
    "skip all remaining",
];

/// Terminal confirmation with "apply to all" memory.
pub struct InteractiveConfirmation {
    apply_all: Mutex<Option<ConfirmChoice>>,
}

impl InteractiveConfirmation {
    pub fn new() -> Self {
        Self {
            apply_all: Mutex::new(None),
        }
    }

    fn prompt_single(&self, prompt: &UpdatePrompt) -> ConfirmChoice {
        let why = match prompt.reason {
            UpdateReason::Regenerate => "mockup changed",
            UpdateReason::ManualEdit => "file was edited by hand",
            UpdateReason::RemoveOrphan => "mockup was removed",
        };

        let selection = Select::new()
            .with_prompt(format!("{} [{}]: {}", prompt.path, prompt.key, why))
            .items(ITEMS)
            .default(if prompt.reason == UpdateReason::ManualEdit { 1 } else { 0 })
            .interact();

        match selection {
            Ok(0) => ConfirmChoice::Apply,
            Ok(1) => ConfirmChoice::Skip,
            Ok(2) => ConfirmChoice::Diff,
            Ok(4) => ConfirmChoice::ApplyAll,
            Ok(5) => ConfirmChoice::SkipAll,
            // Closed terminal or Ctrl-C inside the prompt
            _ => ConfirmChoice::Abort,
        }
    }

    fn remembered(&self) -> Option<ConfirmChoice> {
        self.apply_all.lock().ok().and_then(|guard| *guard)
    }

    fn remember(&self, choice: ConfirmChoice) {
        if let Ok(mut guard) = self.apply_all.lock() {
            *guard = Some(choice);
        }
    }
}

impl Default for InteractiveConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateConfirmation for InteractiveConfirmation {
    fn confirm(&self, prompt: &UpdatePrompt) -> ConfirmChoice {
        if let Some(choice) = self.remembered() {
            return choice;
        }

        match self.prompt_single(prompt) {
            ConfirmChoice::ApplyAll => {
                self.remember(ConfirmChoice::Apply);
                ConfirmChoice::Apply
            }
            ConfirmChoice::SkipAll => {
                self.remember(ConfirmChoice::Skip);
                ConfirmChoice::Skip
            }
            other => other,
        }
    }

    fn show_diff(&self, diff: &str) {
        eprintln!();
        eprintln!("{}", diff);
    }
}
