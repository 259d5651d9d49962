//! Domain Layer
//!
//! The core of mocksmith: pure generation logic without I/O dependencies.
//!
//! ## Structure
//!
//! - `value_objects/` - Immutable value types (Slug, EntityKey, Fingerprint, RunId)
//! - `entities/` - Mockup entities, output artifacts and ledger records
//! - `policies/` - Generation policy (update permission, skip lists, per-slug rules)
//! - `services/` - Composition, comparator, planner, candidate validation
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **Pure Functions** - Comparator and planner are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod policies;
pub mod ports;
pub mod services;
pub mod value_objects;
