//! # ptreval-content
//!
//! Content inspection helpers for corpus discovery: binary sniffing, line
//! statistics and extraction of include directives.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use ptreval_types::FileSize;
use regex::Regex;

/// Bytes inspected when deciding whether a file is binary.
pub const BINARY_SNIFF_BYTES: usize = 8 * 1024;

/// Default include directive: `source("path")` or `source('path')`.
pub const DEFAULT_INCLUDE_PATTERN: &str = r#"source\(\s*["']([^"']+)["']"#;

pub const DEFAULT_COMMENT_MARKER: char = '#';

pub fn read_head(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut buf = vec![0u8; max_bytes];
    let mut filled = 0;
    while filled < max_bytes {
        let n = file
            .read(&mut buf[filled..])
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

/// True when a NUL byte occurs in `head`.
pub fn is_binary(head: &[u8]) -> bool {
    head.contains(&0)
}

pub fn is_binary_file(path: &Path) -> Result<bool> {
    Ok(is_binary(&read_head(path, BINARY_SNIFF_BYTES)?))
}

/// Read a whole file as text, replacing invalid UTF-8. Returns the byte
/// length alongside so sizes reflect the file on disk.
pub fn read_text(path: &Path) -> Result<(u64, String)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let len = bytes.len() as u64;
    Ok((len, String::from_utf8_lossy(&bytes).into_owned()))
}

/// Line statistics of `text`.
///
/// Lines are the pieces between `\n`, so a trailing newline counts one extra
/// empty line. A line is non-empty when it has a non-whitespace character and
/// a code line when that character is not `comment_marker`.
pub fn line_stats(bytes: u64, text: &str, comment_marker: char) -> FileSize {
    let mut size = FileSize {
        bytes,
        ..FileSize::default()
    };
    for line in text.split('\n') {
        size.lines += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        size.non_empty_lines += 1;
        if !trimmed.starts_with(comment_marker) {
            size.code_lines += 1;
        }
    }
    size
}

/// Finds include directives outside of line comments.
#[derive(Debug, Clone)]
pub struct IncludeScanner {
    pattern: Regex,
    comment_marker: char,
}

impl IncludeScanner {
    /// `pattern` must have one capture group holding the included path.
    pub fn new(pattern: &str, comment_marker: char) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid include pattern {pattern:?}"))?;
        anyhow::ensure!(
            pattern.captures_len() >= 2,
            "Include pattern {:?} needs a capture group for the path",
            pattern.as_str()
        );
        Ok(Self {
            pattern,
            comment_marker,
        })
    }

    /// Included paths in order of appearance.
    pub fn includes(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for line in text.lines() {
            let code = strip_line_comment(line, self.comment_marker);
            for caps in self.pattern.captures_iter(code) {
                if let Some(m) = caps.get(1) {
                    out.push(m.as_str().to_string());
                }
            }
        }
        out
    }
}

/// The part of `line` before its comment. A marker inside a `"`, `'` or
/// backtick quoted string does not start a comment.
fn strip_line_comment(line: &str, comment_marker: char) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == comment_marker => return &line[..idx],
            None if matches!(ch, '"' | '\'' | '`') => quote = Some(ch),
            None => {}
        }
    }
    line
}
