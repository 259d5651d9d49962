//! Default code emitter producing React TSX
//!
//! Output is a pure function of the tree and request: no timestamps, no
//! environment lookups, attributes in sorted order.

use crate::domain::entities::ArtifactKind;
use crate::domain::ports::{CandidateFile, CodeEmitter, ComponentNode, ComponentTree, EmitRequest};
use crate::domain::services::route_registry::{relative_import, route_entry};
use crate::domain::value_objects::pascal_case;

#[derive(Debug, Default, Clone, Copy)]
pub struct TsxEmitter;

impl TsxEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl CodeEmitter for TsxEmitter {
    fn emit(&self, tree: &ComponentTree, request: &EmitRequest) -> Vec<CandidateFile> {
        let slug = request.key.slug();
        let rule = request.rule;
        let layout = request.layout;
        let mut out = Vec::new();

        if let Some(variant) = request.key.variant_tag() {
            if rule.permits_kind(ArtifactKind::Component) {
                let path = layout.variant_path(slug, variant);
                let name = format!("{}{}", slug.pascal_case(), pascal_case(variant));
                out.push(CandidateFile {
                    kind: ArtifactKind::Component,
                    content: component_module(tree, &name, &tree.root, &path, request),
                    path,
                });
            }
            return out;
        }

        let page_path = layout.page_path(slug);

        if rule.permits_kind(ArtifactKind::Component) {
            for section in tree.sections() {
                let Some(component) = &section.component else {
                    continue;
                };
                let path = layout.section_path(slug, component);
                let mut body = section.clone();
                body.component = None;
                out.push(CandidateFile {
                    kind: ArtifactKind::Component,
                    content: component_module(tree, &pascal_case(component), &body, &path, request),
                    path,
                });
            }
        }

        if rule.permits_kind(ArtifactKind::Page) {
            out.push(CandidateFile {
                kind: ArtifactKind::Page,
                content: page_module(tree, &page_path, request),
                path: page_path.clone(),
            });
            if let Some(style) = &tree.style {
                let style_path = stylesheet_path(&page_path);
                out.push(CandidateFile {
                    kind: ArtifactKind::Page,
                    content: format!(
                        "/* @generated by mocksmith from {} */\n{}\n",
                        tree.key,
                        style.trim_end()
                    ),
                    path: style_path,
                });
            }
        }

        if rule.permits_kind(ArtifactKind::Route) && rule.permits_kind(ArtifactKind::Page) {
            let registry = layout.registry_path();
            out.push(CandidateFile {
                kind: ArtifactKind::Route,
                content: route_entry(slug, &relative_import(&registry, &page_path)),
                path: registry,
            });
        }

        out
    }
}

fn stylesheet_path(page_path: &str) -> String {
    match page_path.rsplit_once('.') {
        Some((stem, _)) => format!("{}.css", stem),
        None => format!("{}.css", page_path),
    }
}

fn header(tree: &ComponentTree) -> String {
    format!(
        "// @generated by mocksmith from {}. Edits are detected and protected.\n",
        tree.key
    )
}

fn page_module(tree: &ComponentTree, page_path: &str, request: &EmitRequest) -> String {
    let name = format!("{}Page", request.key.slug().pascal_case());
    let mut out = header(tree);

    let mut imports: Vec<String> = Vec::new();
    if request.rule.permits_kind(ArtifactKind::Component) {
        for section in tree.sections() {
            if let Some(component) = &section.component {
                let component = pascal_case(component);
                let target = request.layout.section_path(request.key.slug(), &component);
                imports.push(format!(
                    "import {} from {};",
                    component,
                    js_string(&relative_import(page_path, &target))
                ));
            }
        }
    }
    if tree.style.is_some() {
        let css = stylesheet_path(page_path);
        let file = css.rsplit('/').next().unwrap_or(&css);
        imports.push(format!("import {};", js_string(&format!("./{}", file))));
    }
    for line in &imports {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    if let Some(data) = &tree.data {
        if !request.rule.external_only {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "null".to_string());
            out.push_str(&format!("export const fixture = {} as const;\n\n", json));
        }
    }

    if let Some(title) = &tree.title {
        out.push_str(&format!("export const title = {};\n\n", js_string(title)));
    }

    let inline_sections = request.rule.permits_kind(ArtifactKind::Component);
    out.push_str(&format!("export default function {}() {{\n", name));
    out.push_str("  return (\n");
    render_node(&tree.root, 2, inline_sections, &mut out);
    out.push_str("  );\n}\n");
    out
}

fn component_module(
    tree: &ComponentTree,
    name: &str,
    root: &ComponentNode,
    path: &str,
    request: &EmitRequest,
) -> String {
    let mut out = header(tree);

    let mut nested = Vec::new();
    for child in &root.children {
        child.walk(&mut |node| {
            if let Some(component) = &node.component {
                let component = pascal_case(component);
                if component != name && !nested.contains(&component) {
                    nested.push(component);
                }
            }
        });
    }
    for component in &nested {
        let target = request.layout.section_path(request.key.slug(), component);
        out.push_str(&format!(
            "import {} from {};\n",
            component,
            js_string(&relative_import(path, &target))
        ));
    }
    if !nested.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("export default function {}() {{\n", name));
    out.push_str("  return (\n");
    render_node(root, 2, true, &mut out);
    out.push_str("  );\n}\n");
    out
}

fn render_node(node: &ComponentNode, depth: usize, sections_as_refs: bool, out: &mut String) {
    let indent = "  ".repeat(depth);

    if let Some(text) = &node.text {
        out.push_str(&format!("{}{{{}}}\n", indent, js_string(text)));
        return;
    }
    if sections_as_refs {
        if let Some(component) = &node.component {
            out.push_str(&format!("{}<{} />\n", indent, pascal_case(component)));
            return;
        }
    }

    let attrs = render_attributes(node);
    if node.children.is_empty() && node.tag != "textarea" {
        out.push_str(&format!("{}<{}{} />\n", indent, node.tag, attrs));
        return;
    }

    out.push_str(&format!("{}<{}{}>\n", indent, node.tag, attrs));
    for child in &node.children {
        render_node(child, depth + 1, sections_as_refs, out);
    }
    out.push_str(&format!("{}</{}>\n", indent, node.tag));
}

fn render_attributes(node: &ComponentNode) -> String {
    let mut out = String::new();
    for (name, value) in &node.attributes {
        if name == "data-component" || name == "style" || name.starts_with("on") {
            continue;
        }
        let jsx_name = match name.as_str() {
            "class" => "className",
            "for" => "htmlFor",
            "tabindex" => "tabIndex",
            "readonly" => "readOnly",
            "maxlength" => "maxLength",
            "colspan" => "colSpan",
            "rowspan" => "rowSpan",
            "autocomplete" => "autoComplete",
            other => other,
        };
        if value.is_empty() && !matches!(name.as_str(), "alt" | "value" | "class") {
            out.push_str(&format!(" {}", jsx_name));
        } else {
            out.push_str(&format!(" {}={{{}}}", jsx_name, js_string(value)));
        }
    }
    out
}

/// Double-quoted JS string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
