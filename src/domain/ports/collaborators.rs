//! Collaborator ports - parser, code emitter and API-binding generator
//!
//! These are the pluggable halves of generation. The executor only sees
//! candidate files; it never knows how a mockup became code.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::entities::{ArtifactKind, EndpointDescriptor, MockupEntity, OutputLayout};
use crate::domain::policies::SlugRule;
use crate::domain::value_objects::EntityKey;

/// One element of a parsed mockup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Text content directly inside this element
    pub text: Option<String>,
    /// Name requested via `data-component`, promoted to its own component
    pub component: Option<String>,
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Depth-first walk over this node and its descendants
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ComponentNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Parsed form of one mockup entity
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTree {
    pub key: EntityKey,
    pub title: Option<String>,
    pub root: ComponentNode,
    /// Stylesheet content, if the entity has one
    pub style: Option<String>,
    /// Data fixture, if the entity has one
    pub data: Option<serde_json::Value>,
}

impl ComponentTree {
    /// Named sections in document order, first occurrence wins
    pub fn sections(&self) -> Vec<&ComponentNode> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        self.root.walk(&mut |node| {
            if let Some(name) = &node.component {
                if seen.insert(name.clone()) {
                    out.push(node);
                }
            }
        });
        out
    }
}

/// Why a mockup could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

/// A generated file awaiting staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub kind: ArtifactKind,
    /// Forward-slash path relative to the output root
    pub path: String,
    pub content: String,
}

/// What to emit for one key
#[derive(Debug, Clone, Copy)]
pub struct EmitRequest<'a> {
    pub key: &'a EntityKey,
    pub rule: &'a SlugRule,
    pub layout: &'a OutputLayout,
}

/// Turns a mockup entity into a component tree. Pure.
pub trait MockupParser {
    fn parse(&self, entity: &MockupEntity) -> Result<ComponentTree, ParseError>;
}

/// Turns a component tree into candidate files. Deterministic; never writes.
pub trait CodeEmitter {
    fn emit(&self, tree: &ComponentTree, request: &EmitRequest) -> Vec<CandidateFile>;
}

/// Turns endpoint descriptors into binding files. Deterministic; never writes.
pub trait BindingGenerator {
    fn generate(
        &self,
        endpoints: &[EndpointDescriptor],
        request: &EmitRequest,
    ) -> Vec<CandidateFile>;
}
