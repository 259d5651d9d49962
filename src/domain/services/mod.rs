//! Domain Services
//!
//! Stateless domain logic. Nothing here performs I/O.

pub mod comparator;
pub mod composition;
pub mod planner;
pub mod route_registry;
pub mod validation;

pub use comparator::{compare, Classification};
pub use composition::{compose, Composition, CompositionRules, EntityDraft};
pub use planner::{build_plan, Plan, PlanStep, StepKind};
pub use validation::{validate_candidate, validate_relative_path};
