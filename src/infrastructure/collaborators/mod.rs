//! Default implementations of the generation collaborators

pub mod fetch_bindings;
pub mod markup_parser;
pub mod tsx_emitter;

pub use fetch_bindings::{FetchBindingGenerator, DEFAULT_BASE_URL_ENV};
pub use markup_parser::HtmlMockupParser;
pub use tsx_emitter::TsxEmitter;
