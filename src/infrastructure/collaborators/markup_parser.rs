//! Default mockup parser
//!
//! A tolerant HTML reader producing a `ComponentTree`. It understands tags,
//! attributes, text, comments and void elements; unclosed elements are
//! closed at end of input. Anything a browser would need a full HTML5
//! parser for is out of its reach, and the port lets a real one replace it.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::domain::entities::{MockupEntity, SourceRole};
use crate::domain::ports::{ComponentNode, ComponentTree, MockupParser, ParseError};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is never part of the component tree
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "head", "template"];

/// Parser reading sources from the mockup root
pub struct HtmlMockupParser {
    root: PathBuf,
}

impl HtmlMockupParser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, rel: &str) -> Result<String, ParseError> {
        fs::read_to_string(self.root.join(rel))
            .map_err(|e| ParseError::new(format!("cannot read {}: {}", rel, e)))
    }
}

impl MockupParser for HtmlMockupParser {
    fn parse(&self, entity: &MockupEntity) -> Result<ComponentTree, ParseError> {
        let markup = entity
            .markup()
            .ok_or_else(|| ParseError::new("entity has no markup source"))?;
        let html = self.read(&markup.path)?;
        let (root, title) = parse_html(&html)?;

        let style = match entity.files_with_role(SourceRole::Style).next() {
            Some(file) => Some(self.read(&file.path)?),
            None => None,
        };
        let data = match entity.files_with_role(SourceRole::Data).next() {
            Some(file) => {
                let raw = self.read(&file.path)?;
                Some(serde_json::from_str(&raw).map_err(|e| {
                    ParseError::new(format!("{} is not valid JSON: {}", file.path, e))
                })?)
            }
            None => None,
        };

        Ok(ComponentTree {
            key: entity.key().clone(),
            title,
            root,
            style,
            data,
        })
    }
}

/// Parse markup into a root node (the `<body>` if present) and the `<title>`.
pub fn parse_html(html: &str) -> Result<(ComponentNode, Option<String>), ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::new("markup is empty"));
    }

    let mut stack: Vec<ComponentNode> = vec![ComponentNode::element("#document")];
    let mut title: Option<String> = None;
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| ParseError::new("unterminated comment"))?;
            rest = &after[end + 3..];
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .ok_or_else(|| ParseError::new("unterminated declaration"))?;
            rest = &rest[end + 1..];
        } else if let Some(after) = rest.strip_prefix("</") {
            let end = after
                .find('>')
                .ok_or_else(|| ParseError::new("unterminated closing tag"))?;
            let name = after[..end].trim().to_ascii_lowercase();
            rest = &after[end + 1..];
            close_element(&mut stack, &name)?;
        } else if rest.starts_with('<')
            && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
        {
            let end = find_tag_end(rest)
                .ok_or_else(|| ParseError::new("unterminated tag"))?;
            let inner = &rest[1..end];
            rest = &rest[end + 1..];

            let self_closing = inner.trim_end().ends_with('/');
            let inner = inner.trim_end().trim_end_matches('/');
            let (name, attributes) = parse_tag(inner);

            if SKIPPED_ELEMENTS.contains(&name.as_str()) && !self_closing {
                let close = format!("</{}", name);
                let lower = rest.to_ascii_lowercase();
                let body_end = lower
                    .find(&close)
                    .ok_or_else(|| ParseError::new(format!("unclosed <{}>", name)))?;
                if name == "head" {
                    title = extract_title(&rest[..body_end]).or(title);
                }
                let after_close = &rest[body_end..];
                let gt = after_close
                    .find('>')
                    .ok_or_else(|| ParseError::new(format!("unterminated </{}>", name)))?;
                rest = &after_close[gt + 1..];
                continue;
            }

            if name == "title" {
                let lower = rest.to_ascii_lowercase();
                if let Some(end) = lower.find("</title") {
                    title = Some(collapse_whitespace(&rest[..end]));
                    let after_close = &rest[end..];
                    let gt = after_close.find('>').unwrap_or(after_close.len() - 1);
                    rest = &after_close[gt + 1..];
                    continue;
                }
            }

            let mut node = ComponentNode::element(name.clone());
            node.component = attributes.get("data-component").cloned();
            node.attributes = attributes;

            if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
                push_child(&mut stack, node);
            } else {
                stack.push(node);
            }
        } else {
            let end = rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len());
            let text = collapse_whitespace(&decode_entities(&rest[..end]));
            rest = &rest[end..];
            if !text.is_empty() {
                let mut node = ComponentNode::element("#text");
                node.text = Some(text);
                push_child(&mut stack, node);
            }
        }
    }

    while stack.len() > 1 {
        let node = stack.pop().unwrap_or_default();
        push_child(&mut stack, node);
    }
    let document = stack.pop().unwrap_or_default();

    let root = find_body(&document).unwrap_or(document);
    let mut root = root;
    root.tag = "main".to_string();
    if root.children.is_empty() {
        return Err(ParseError::new("markup has no content"));
    }
    Ok((root, title))
}

fn push_child(stack: &mut [ComponentNode], node: ComponentNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn close_element(stack: &mut Vec<ComponentNode>, name: &str) -> Result<(), ParseError> {
    let Some(pos) = stack.iter().rposition(|n| n.tag == name) else {
        return Err(ParseError::new(format!("closing </{}> has no open tag", name)));
    };
    if pos == 0 {
        return Err(ParseError::new(format!("closing </{}> has no open tag", name)));
    }
    while stack.len() > pos {
        let node = stack.pop().unwrap_or_default();
        push_child(stack, node);
    }
    Ok(())
}

fn find_body(node: &ComponentNode) -> Option<ComponentNode> {
    if node.tag == "body" {
        return Some(node.clone());
    }
    node.children.iter().find_map(find_body)
}

fn extract_title(head: &str) -> Option<String> {
    let lower = head.to_ascii_lowercase();
    let start = lower.find("<title")?;
    let open_end = head[start..].find('>')? + start + 1;
    let end = lower[open_end..].find("</title")? + open_end;
    Some(collapse_whitespace(&head[open_end..end]))
}

/// Index of the `>` closing a tag, skipping quoted attribute values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_tag(inner: &str) -> (String, BTreeMap<String, String>) {
    let inner = inner.trim();
    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    let mut attributes = BTreeMap::new();

    let mut rest = inner[name_end..].trim_start();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    rest = body.get(end + 1..).unwrap_or("").trim_start();
                    decode_entities(&body[..end])
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    rest = after_eq[end..].trim_start();
                    decode_entities(&after_eq[..end])
                }
            }
        } else {
            String::new()
        };

        if !key.is_empty() {
            attributes.insert(key, value);
        }
    }

    (name, attributes)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
