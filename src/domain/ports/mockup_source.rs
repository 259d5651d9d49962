//! Mockup Source Port
//!
//! Read-only access to the mockup inventory.

use std::path::Path;

use crate::domain::entities::MockupInventory;
use crate::error::MocksmithResult;

/// Result of scanning the mockup tree
#[derive(Debug, Clone, Default)]
pub struct MockupScan {
    pub inventory: MockupInventory,
    /// Files with a known role but no markup sibling
    pub unattached: Vec<String>,
    /// Files with no known role
    pub unrecognized: Vec<String>,
}

/// Source of mockup entities. Implementations never write.
pub trait MockupSource {
    /// Root of the mockup tree; nothing under it is ever a write target
    fn root(&self) -> &Path;

    fn scan(&self) -> MocksmithResult<MockupScan>;
}
