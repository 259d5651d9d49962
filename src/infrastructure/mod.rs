//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system
//! - `repositories/` - JSON run ledger
//! - `scanner` - Mockup tree walker
//! - `collaborators/` - Default parser, code emitter and binding generator
//! - `confirmation/` - Terminal confirmation prompts
//! - `events/` - NDJSON event stream
//! - `lock` - Exclusive run lock

pub mod collaborators;
pub mod confirmation;
pub mod events;
pub mod fs;
pub mod lock;
pub mod repositories;
pub mod scanner;

// Re-export for convenience
pub use collaborators::{FetchBindingGenerator, HtmlMockupParser, TsxEmitter};
pub use confirmation::InteractiveConfirmation;
pub use events::JsonEventSink;
pub use fs::LocalFs;
pub use lock::RunLock;
pub use repositories::JsonLedgerRepository;
pub use scanner::FsMockupScanner;
