//! Include/skip path rules
//!
//! Handles the scanner's include and skip patterns using gitignore semantics.
//! Skip patterns come from configuration plus an optional `.mocksmithignore`
//! file at the root of the scanned tree.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the optional skip file at the root of a mockup tree
pub const IGNORE_FILE_NAME: &str = ".mocksmithignore";

/// Maximum file size for `.mocksmithignore` (64KB)
const MAX_FILE_SIZE: u64 = 65536;

/// Maximum number of patterns allowed
const MAX_PATTERNS: usize = 1000;

/// Compiled include/skip rules for one tree.
#[derive(Debug, Clone)]
pub struct PathRules {
    include: Gitignore,
    include_count: usize,
    skip: Gitignore,
    skip_count: usize,
}

impl Default for PathRules {
    fn default() -> Self {
        Self::empty()
    }
}

impl PathRules {
    /// Rules that include everything and skip nothing.
    pub fn empty() -> Self {
        Self {
            include: Gitignore::empty(),
            include_count: 0,
            skip: Gitignore::empty(),
            skip_count: 0,
        }
    }

    /// Build rules from configured patterns plus `<root>/.mocksmithignore` if present.
    pub fn load(root: &Path, include: &[String], skip: &[String]) -> Result<Self, PathRulesError> {
        let ignore_path = root.join(IGNORE_FILE_NAME);
        let file_patterns = if ignore_path.is_file() {
            let metadata = fs::metadata(&ignore_path).map_err(PathRulesError::Io)?;
            if metadata.len() > MAX_FILE_SIZE {
                return Err(PathRulesError::FileTooLarge {
                    path: ignore_path,
                    size: metadata.len(),
                    limit: MAX_FILE_SIZE,
                });
            }
            fs::read_to_string(&ignore_path).map_err(PathRulesError::Io)?
        } else {
            String::new()
        };

        let mut skip_lines: Vec<(Option<PathBuf>, String)> = skip
            .iter()
            .map(|pattern| (None, pattern.clone()))
            .collect();
        skip_lines.extend(
            file_patterns
                .lines()
                .map(|line| (Some(ignore_path.clone()), line.to_string())),
        );
        // The skip file itself is never a mockup source.
        skip_lines.push((None, format!("/{}", IGNORE_FILE_NAME)));

        let include_lines: Vec<(Option<PathBuf>, String)> = include
            .iter()
            .map(|pattern| (None, pattern.clone()))
            .collect();

        let (include, include_count) = build_matcher(root, &include_lines)?;
        let (skip, skip_count) = build_matcher(root, &skip_lines)?;

        Ok(Self {
            include,
            include_count,
            skip,
            skip_count,
        })
    }

    /// Whether a directory should be descended into.
    pub fn allows_dir(&self, rel_path: &Path) -> bool {
        !self.is_skipped(rel_path, true)
    }

    /// Whether a file participates in the scan.
    pub fn allows_file(&self, rel_path: &Path) -> bool {
        if self.is_skipped(rel_path, false) {
            return false;
        }
        self.include_count == 0
            || self
                .include
                .matched_path_or_any_parents(rel_path, false)
                .is_ignore()
    }

    fn is_skipped(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.skip_count > 0
            && self
                .skip
                .matched_path_or_any_parents(rel_path, is_dir)
                .is_ignore()
    }

    pub fn skip_count(&self) -> usize {
        self.skip_count
    }

    pub fn include_count(&self) -> usize {
        self.include_count
    }
}

fn build_matcher(
    root: &Path,
    lines: &[(Option<PathBuf>, String)],
) -> Result<(Gitignore, usize), PathRulesError> {
    let mut builder = GitignoreBuilder::new(root);
    let mut count = 0;

    for (line_num, (source, line)) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        count += 1;
        if count > MAX_PATTERNS {
            return Err(PathRulesError::TooManyPatterns {
                count,
                limit: MAX_PATTERNS,
            });
        }

        if let Err(e) = builder.add_line(source.clone(), trimmed) {
            return Err(PathRulesError::InvalidPattern {
                line: line_num + 1,
                pattern: line.clone(),
                message: e.to_string(),
            });
        }
    }

    let matcher = builder
        .build()
        .map_err(|e| PathRulesError::BuildFailed(e.to_string()))?;
    Ok((matcher, count))
}

/// Errors that can occur when compiling path rules.
#[derive(Debug)]
pub enum PathRulesError {
    /// The `.mocksmithignore` file exceeds the size limit.
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },
    /// Too many patterns.
    TooManyPatterns { count: usize, limit: usize },
    /// A pattern has invalid syntax.
    InvalidPattern {
        line: usize,
        pattern: String,
        message: String,
    },
    /// Failed to build the gitignore matcher.
    BuildFailed(String),
    /// IO error reading the file.
    Io(std::io::Error),
}

impl fmt::Display for PathRulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileTooLarge { path, size, limit } => write!(
                f,
                "{} exceeds {}KB limit ({} bytes): {}",
                IGNORE_FILE_NAME,
                limit / 1024,
                size,
                path.display()
            ),
            Self::TooManyPatterns { count, limit } => {
                write!(f, "{} patterns exceed the {} limit", count, limit)
            }
            Self::InvalidPattern {
                line,
                pattern,
                message,
            } => write!(f, "invalid pattern #{}: '{}' - {}", line, pattern, message),
            Self::BuildFailed(msg) => write!(f, "failed to build path rules: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for PathRulesError {}
