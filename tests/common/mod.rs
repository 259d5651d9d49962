//! Common test utilities for mocksmith CLI and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory plus helpers to run the binary
//! - Assertion macros: `assert_generated!`, `assert_output_contains!`, etc.
//! - Fixtures: Reusable mockup content

#![allow(dead_code)]

#[macro_use]
pub mod assertions;
pub mod env;
pub mod fixtures;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
