//! Shared route registry
//!
//! All route artifacts land in one generated registry file. Each slug owns
//! exactly one line, tagged with a trailing marker comment, so the file can
//! be rewritten entry by entry while other slugs' lines stay byte-identical.

use std::collections::BTreeMap;

use crate::domain::value_objects::Slug;

const HEADER: &str = "// @generated by mocksmith";
const MARKER: &str = "// mocksmith:route ";
const OPEN: &str = "export const generatedRoutes: GeneratedRoute[] = [";
const CLOSE: &str = "];";

/// Route path for a slug: `/` + slug, with a top-level `index` or `home` mapped to `/`.
pub fn route_path(slug: &Slug) -> String {
    match slug.as_str() {
        "index" | "home" => "/".to_string(),
        other => format!("/{}", other),
    }
}

/// The registry line for one slug.
pub fn route_entry(slug: &Slug, import_path: &str) -> String {
    format!(
        "  {{ path: {}, load: () => import({}) }}, {}{}",
        quote(&route_path(slug)),
        quote(import_path),
        MARKER,
        slug
    )
}

/// Relative module specifier from `from_file` to `to_file`, without extension.
///
/// Both are forward-slash paths relative to the same root.
pub fn relative_import(from_file: &str, to_file: &str) -> String {
    let from_dir: Vec<&str> = match from_file.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target = match to_file.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => to_file,
    };
    let to_parts: Vec<&str> = target.split('/').collect();

    let common = from_dir
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..from_dir.len() {
        parts.push("..");
    }
    parts.extend(&to_parts[common..]);

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Read managed entries out of an existing registry.
///
/// Returns an error when the content exists but was not generated by us.
pub fn parse_entries(content: &str) -> Result<BTreeMap<String, String>, String> {
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    if !content.starts_with(HEADER) {
        return Err("registry file exists but was not generated by mocksmith".to_string());
    }
    let mut entries = BTreeMap::new();
    for line in content.lines() {
        if let Some(idx) = line.rfind(MARKER) {
            let slug = line[idx + MARKER.len()..].trim().to_string();
            if !slug.is_empty() {
                entries.insert(slug, line.to_string());
            }
        }
    }
    Ok(entries)
}

/// The line owned by `slug`, if present.
pub fn entry_for(content: &str, slug: &Slug) -> Option<String> {
    parse_entries(content)
        .ok()
        .and_then(|mut entries| entries.remove(slug.as_str()))
}

/// Render a full registry from entries (sorted by slug).
pub fn render(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str("// Lines tagged `mocksmith:route` are rewritten on every run.\n\n");
    out.push_str("export interface GeneratedRoute {\n");
    out.push_str("  path: string;\n");
    out.push_str("  load: () => Promise<unknown>;\n");
    out.push_str("}\n\n");
    out.push_str(OPEN);
    out.push('\n');
    for line in entries.values() {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(CLOSE);
    out.push('\n');
    out
}

/// Apply one upsert or removal to existing registry content.
pub fn merge(existing: Option<&str>, slug: &Slug, entry: Option<&str>) -> Result<String, String> {
    let mut entries = parse_entries(existing.unwrap_or(""))?;
    match entry {
        Some(line) => {
            entries.insert(slug.to_string(), line.to_string());
        }
        None => {
            entries.remove(slug.as_str());
        }
    }
    Ok(render(&entries))
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}
