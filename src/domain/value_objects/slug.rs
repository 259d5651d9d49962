//! Slug Value Objects
//!
//! A slug is the stable identifier shared by a mockup entity and the output
//! artifacts generated from it. Slugs are derived from paths:
//!
//! - lower-cased
//! - path separators normalized to `/`
//! - whitespace and `_` folded to `-`
//! - a configured variant suffix (`-mobile`, `-dark`) is stripped into a
//!   variant tag instead of producing a new base slug

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalized slug
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

/// Why a raw name could not become a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    Empty,
    InvalidSegment(String),
}

impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlugError::Empty => write!(f, "slug is empty"),
            SlugError::InvalidSegment(seg) => write!(f, "invalid slug segment '{}'", seg),
        }
    }
}

impl std::error::Error for SlugError {}

impl Slug {
    /// Normalize a raw path-like name (without extension) into a slug.
    pub fn normalize(raw: &str) -> Result<Self, SlugError> {
        let unified = raw.replace('\\', "/");
        let mut segments = Vec::new();

        for segment in unified.split('/') {
            let trimmed = segment.trim();
            if trimmed.is_empty() || trimmed == "." {
                continue;
            }
            if trimmed == ".." {
                return Err(SlugError::InvalidSegment(trimmed.to_string()));
            }

            let mut normalized = String::with_capacity(trimmed.len());
            for ch in trimmed.chars() {
                if ch.is_whitespace() || ch == '_' {
                    if !normalized.ends_with('-') {
                        normalized.push('-');
                    }
                } else {
                    normalized.extend(ch.to_lowercase());
                }
            }
            let normalized = normalized.trim_matches('-').to_string();
            if normalized.is_empty() || normalized == "." || normalized == ".." {
                return Err(SlugError::InvalidSegment(segment.to_string()));
            }
            segments.push(normalized);
        }

        if segments.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (`pages/checkout` → `checkout`)
    pub fn leaf(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Split a variant suffix off the last segment.
    ///
    /// Returns the base slug and the variant tag when the last segment ends
    /// with `-<suffix>` for one of the configured suffixes and something
    /// remains before it.
    pub fn split_variant(&self, suffixes: &[String]) -> (Slug, Option<String>) {
        let (prefix, leaf) = match self.0.rsplit_once('/') {
            Some((prefix, leaf)) => (Some(prefix), leaf),
            None => (None, self.0.as_str()),
        };

        for suffix in suffixes {
            let suffix = suffix.trim().trim_start_matches('-').to_lowercase();
            if suffix.is_empty() {
                continue;
            }
            let marker = format!("-{}", suffix);
            if let Some(base_leaf) = leaf.strip_suffix(&marker) {
                if base_leaf.is_empty() {
                    continue;
                }
                let base = match prefix {
                    Some(prefix) => format!("{}/{}", prefix, base_leaf),
                    None => base_leaf.to_string(),
                };
                return (Slug(base), Some(suffix));
            }
        }

        (self.clone(), None)
    }

    /// PascalCase identifier derived from the leaf (`order-history` → `OrderHistory`)
    pub fn pascal_case(&self) -> String {
        pascal_case(self.leaf())
    }
}

/// PascalCase a kebab-case word list
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'M');
    }
    out
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Slug::normalize(&s)
    }
}

impl From<Slug> for String {
    fn from(s: Slug) -> Self {
        s.0
    }
}

impl FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slug::normalize(s)
    }
}

/// Identity of one comparable unit: a base slug, optionally narrowed to a variant.
///
/// Variants are tracked independently of their base, so `checkout` and
/// `checkout@mobile` each own their own artifacts and fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey {
    slug: Slug,
    variant: Option<String>,
}

impl EntityKey {
    pub const VARIANT_SEPARATOR: char = '@';

    pub fn base(slug: Slug) -> Self {
        Self {
            slug,
            variant: None,
        }
    }

    pub fn variant(slug: Slug, variant: impl Into<String>) -> Self {
        Self {
            slug,
            variant: Some(variant.into()),
        }
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn variant_tag(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn is_variant(&self) -> bool {
        self.variant.is_some()
    }

    /// Whether a user-supplied selector (`checkout` or `checkout@mobile`) names this key
    pub fn matches_selector(&self, selector: &str) -> bool {
        match selector.parse::<EntityKey>() {
            Ok(key) if key.variant.is_some() => key == *self,
            Ok(key) => key.slug == self.slug,
            Err(_) => false,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(v) => write!(f, "{}{}{}", self.slug, Self::VARIANT_SEPARATOR, v),
            None => write!(f, "{}", self.slug),
        }
    }
}

impl FromStr for EntityKey {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(Self::VARIANT_SEPARATOR) {
            Some((slug, variant)) if !variant.trim().is_empty() => Ok(Self::variant(
                Slug::normalize(slug)?,
                variant.trim().to_lowercase(),
            )),
            _ => Ok(Self::base(Slug::normalize(s)?)),
        }
    }
}

impl TryFrom<String> for EntityKey {
    type Error = SlugError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityKey> for String {
    fn from(k: EntityKey) -> Self {
        k.to_string()
    }
}
