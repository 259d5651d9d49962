//! Generate Module
//!
//! Orchestrates one `generate` run: recover, scan, plan, execute, record.
//!
//! ## Structure
//!
//! - `options` - Run inputs (`GenerateOptions`)
//! - `result` - Run outcome (`GenerateResult`)
//! - `use_case` - Core use case logic (`GenerateUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use mocksmith::application::generate::{GenerateOptions, GenerateUseCase};
//!
//! let use_case = GenerateUseCase::new(ledger, fs, collaborators);
//! let result = use_case.execute(&options, events, confirmation)?;
//! std::process::exit(result.exit_code());
//! ```

mod options;
mod result;
mod use_case;

pub use options::GenerateOptions;
pub use result::{GenerateResult, RecoveredRun};
pub use use_case::{Collaborators, GenerateUseCase};

#[cfg(test)]
mod tests;
