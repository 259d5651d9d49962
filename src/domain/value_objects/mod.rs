//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod fingerprint;
mod path_rules;
mod run_id;
mod slug;

pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use path_rules::{PathRules, PathRulesError, IGNORE_FILE_NAME};
pub use run_id::{InvalidRunId, RunId};
pub use slug::{pascal_case, EntityKey, Slug, SlugError};
