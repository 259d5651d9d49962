//! Domain Policies
//!
//! Business rules that govern what a run may write.

mod generation_policy;

pub use generation_policy::{GenerationPolicy, SlugRule};
