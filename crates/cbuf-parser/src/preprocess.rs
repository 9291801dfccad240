//! Source preprocessing: comment stripping and `#import` splicing.
//!
//! The preprocessor is the only stage that knows about imports. It takes a
//! caller-supplied mapping from import path to source text (the library
//! itself never touches the filesystem) and produces one self-contained
//! text with no `#import` lines and no comments.
//!
//! Imports are recursive. A seen-set makes the second and later occurrence
//! of the same path expand to empty text, which both deduplicates shared
//! imports and breaks cycles.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Preprocessing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("import not found: \"{0}\"")]
    ImportNotFound(String),
}

/// Strip comments and splice imports into one self-contained text.
///
/// `imports` maps the exact path string written in `#import "path"` to the
/// text of that file. Preprocessing is idempotent: running the output
/// through again is a no-op.
pub fn preprocess(
    text: &str,
    imports: &HashMap<String, String>,
) -> Result<String, PreprocessError> {
    let mut seen = HashSet::new();
    expand(text, imports, &mut seen)
}

fn expand(
    text: &str,
    imports: &HashMap<String, String>,
    seen: &mut HashSet<String>,
) -> Result<String, PreprocessError> {
    let stripped = strip_comments(text);
    let mut out = String::with_capacity(stripped.len());

    for line in stripped.split_inclusive('\n') {
        match parse_import_line(line) {
            Some(path) => {
                if seen.insert(path.to_owned()) {
                    let imported = imports
                        .get(path)
                        .ok_or_else(|| PreprocessError::ImportNotFound(path.to_owned()))?;
                    out.push_str(&expand(imported, imports, seen)?);
                    out.push('\n');
                }
                // Already expanded: the line is replaced by nothing.
            }
            None => out.push_str(line),
        }
    }

    Ok(out)
}

/// Recognize `#import "path"` with optional surrounding whitespace.
fn parse_import_line(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#import")?;
    let rest = rest.trim();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Remove `//…` and `/*…*/` comments.
///
/// The scan tracks double-quote state so comment markers inside string
/// literals (default values) survive. Line comments leave their newline in
/// place; block comments are removed wholesale, including any newlines
/// they span. An unterminated block comment is stripped to end of input.
fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    let mut in_string = false;

    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            out.push(c);
            if c == b'\\' && i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
                i += 2;
                continue;
            }
            if c == b'"' {
                in_string = false;
            }
            i += 1;
        } else if c == b'"' {
            in_string = true;
            out.push(c);
            i += 1;
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
        } else {
            out.push(c);
            i += 1;
        }
    }

    // Cuts only happen at ASCII delimiters, so the result is still UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}
