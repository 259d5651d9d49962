//! Candidate validation
//!
//! Structural checks run on staged candidates before anything is committed.
//! These are not full parsers: they catch truncated or malformed emitter
//! output (unbalanced delimiters, invalid JSON, unsafe paths).

use std::path::Path;

/// Reject anything that could escape the output root.
pub fn validate_relative_path(path: &str) -> Result<(), String> {
    if path.trim().is_empty() {
        return Err("empty target path".to_string());
    }
    if path.contains('\\') {
        return Err(format!("'{}' uses backslash separators", path));
    }
    if path.starts_with('/') || Path::new(path).is_absolute() || path.contains(':') {
        return Err(format!("'{}' is not a relative path", path));
    }
    if path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
        return Err(format!("'{}' contains an empty or parent segment", path));
    }
    Ok(())
}

/// Check that a candidate is syntactically well-formed for its extension.
pub fn validate_candidate(path: &str, content: &str) -> Result<(), String> {
    validate_relative_path(path)?;
    if content.trim().is_empty() {
        return Err(format!("'{}' has empty content", path));
    }

    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match extension {
        "json" => serde_json::from_str::<serde_json::Value>(content)
            .map(|_| ())
            .map_err(|e| format!("'{}' is not valid JSON: {}", path, e)),
        "ts" | "tsx" | "js" | "jsx" | "mjs" | "css" | "scss" => {
            check_delimiters(content).map_err(|e| format!("'{}': {}", path, e))
        }
        _ => Ok(()),
    }
}

/// Balanced `()[]{}` outside strings and comments.
fn check_delimiters(content: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = content.chars().peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(format!("unterminated block comment (line {})", line));
                }
            }
            '"' | '\'' | '`' => {
                let start = line;
                let mut escaped = false;
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        if ch != '`' {
                            break;
                        }
                    }
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == ch {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(format!("unterminated string starting on line {}", start));
                }
            }
            '(' | '[' | '{' => stack.push((ch, line)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, open_line)) => {
                        return Err(format!(
                            "'{}' on line {} closes '{}' from line {}",
                            ch, line, open, open_line
                        ))
                    }
                    None => return Err(format!("unmatched '{}' on line {}", ch, line)),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, open_line)) => Err(format!("unclosed '{}' from line {}", open, open_line)),
        None => Ok(()),
    }
}
