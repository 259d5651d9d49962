//! Default API binding generator
//!
//! Emits one `fetch`-based TypeScript module per slug. The base URL is read
//! from `import.meta.env` at runtime under a configurable variable name; no
//! URL or credential is ever written into the generated file.

use crate::domain::entities::{ArtifactKind, EndpointDescriptor};
use crate::domain::ports::{BindingGenerator, CandidateFile, EmitRequest};
use crate::domain::value_objects::pascal_case;

pub const DEFAULT_BASE_URL_ENV: &str = "MOCKSMITH_API_BASE_URL";

#[derive(Debug, Clone)]
pub struct FetchBindingGenerator {
    base_url_env: String,
}

impl Default for FetchBindingGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL_ENV)
    }
}

impl FetchBindingGenerator {
    pub fn new(base_url_env: impl Into<String>) -> Self {
        Self {
            base_url_env: base_url_env.into(),
        }
    }

    pub fn base_url_env(&self) -> &str {
        &self.base_url_env
    }
}

impl BindingGenerator for FetchBindingGenerator {
    fn generate(
        &self,
        endpoints: &[EndpointDescriptor],
        request: &EmitRequest,
    ) -> Vec<CandidateFile> {
        if endpoints.is_empty()
            || request.key.is_variant()
            || !request.rule.permits_kind(ArtifactKind::ApiBinding)
        {
            return Vec::new();
        }

        let mut out = format!(
            "// @generated by mocksmith from {}. Edits are detected and protected.\n\n",
            request.key
        );
        out.push_str(&format!(
            "const baseUrl: string = import.meta.env.{} ?? \"\";\n",
            env_identifier(&self.base_url_env)
        ));

        let mut names = Vec::new();
        for endpoint in endpoints {
            let mut name = function_name(&endpoint.name);
            let mut n = 2;
            while names.contains(&name) {
                name = format!("{}{}", function_name(&endpoint.name), n);
                n += 1;
            }
            names.push(name.clone());

            let method = endpoint.method.trim().to_ascii_uppercase();
            let path = js_string(&endpoint.path);
            let label = js_string(&format!("{} {} failed: ", method, endpoint.path));
            out.push_str(&format!(
                "\nexport async function {name}(init: RequestInit = {{}}): Promise<unknown> {{\n\
                 \x20 const response = await fetch(baseUrl + {path}, {{ ...init, method: {method} }});\n\
                 \x20 if (!response.ok) {{\n\
                 \x20   throw new Error({label} + response.status);\n\
                 \x20 }}\n\
                 \x20 return response.json();\n\
                 }}\n",
                name = name,
                path = path,
                method = js_string(&method),
                label = label,
            ));
        }

        vec![CandidateFile {
            kind: ArtifactKind::ApiBinding,
            path: request.layout.api_path(request.key.slug()),
            content: out,
        }]
    }
}

/// camelCase function name for an endpoint (`list orders` → `listOrders`)
fn function_name(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "call".to_string(),
    }
}

/// Keep only identifier characters so the variable name cannot inject code.
fn env_identifier(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() || cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        DEFAULT_BASE_URL_ENV.to_string()
    } else {
        cleaned
    }
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
