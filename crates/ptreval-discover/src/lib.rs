//! # ptreval-discover
//!
//! **Tier 1 (Corpus)**
//!
//! Walks a source tree and turns every matching file into either a catalog
//! entry with its cost or an exclusion.
//!
//! A file is excluded when it is binary, empty (zero bytes or no non-blank
//! line) or holds no code line. Every other file is eligible, and its cost
//! pairs its own size with the size it has once every file it includes is
//! inlined, recursively and up to a bounded depth.
//!
//! ## What belongs here
//! * Eligibility rules
//! * Include-aware cost computation
//!
//! ## What does NOT belong here
//! * Traversal mechanics (use ptreval-walk)
//! * Bucket assignment (use ptreval-distribute)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ptreval_content::{
    DEFAULT_COMMENT_MARKER, DEFAULT_INCLUDE_PATTERN, IncludeScanner, is_binary_file, line_stats,
    read_text,
};
use ptreval_types::{CatalogEntry, DiscoveryReport, FileCost, FileSize};
use thiserror::Error;
use tracing::{debug, info};

/// Default bound on nested includes, counting the root file.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("Source root {} does not exist", path.display())]
    RootMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source root {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Failed to walk {}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid include pattern")]
    Pattern(#[source] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// File extensions to consider, without the dot.
    pub extensions: Vec<String>,
    pub comment_marker: char,
    /// Regex with one capture group holding the included path.
    pub include_pattern: String,
    pub max_include_depth: usize,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            extensions: ptreval_walk::DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            comment_marker: DEFAULT_COMMENT_MARKER,
            include_pattern: DEFAULT_INCLUDE_PATTERN.to_string(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

/// Discover the corpus under `root`.
///
/// Paths in the report are the canonical root joined with each file's
/// relative path, in walk order (sorted by path).
pub fn discover(root: &Path, options: &DiscoverOptions) -> Result<DiscoveryReport, DiscoverError> {
    let root = std::fs::canonicalize(root).map_err(|source| DiscoverError::RootMissing {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(DiscoverError::NotADirectory { path: root });
    }

    let files = ptreval_walk::list_files(&root, &options.extensions).map_err(|source| {
        DiscoverError::Walk {
            root: root.clone(),
            source,
        }
    })?;
    info!(root = %root.display(), files = files.len(), "discovering corpus");

    let scanner = IncludeScanner::new(&options.include_pattern, options.comment_marker)
        .map_err(DiscoverError::Pattern)?;
    let mut costs = CostCache::new(scanner, options.comment_marker);
    let mut report = DiscoveryReport::default();

    for path in files {
        let shown = path.to_string_lossy().into_owned();
        let read_err = |source| DiscoverError::Read {
            path: path.clone(),
            source,
        };

        if is_binary_file(&path).map_err(read_err)? {
            debug!(file = %shown, "excluded: binary");
            report.excluded_binary.push(shown);
            continue;
        }

        let (bytes, text) = read_text(&path).map_err(read_err)?;
        let single = line_stats(bytes, &text, options.comment_marker);
        if single.bytes == 0 || single.non_empty_lines == 0 {
            debug!(file = %shown, "excluded: empty");
            report.excluded_empty.push(shown);
            continue;
        }
        if single.code_lines == 0 {
            debug!(file = %shown, "excluded: no code");
            report.excluded_non_code.push(shown);
            continue;
        }

        let inlined = single
            + costs.included(&path, &text, options.max_include_depth.saturating_sub(1));
        if inlined.bytes > single.bytes {
            report.files_that_include += 1;
        }
        report.eligible.push(CatalogEntry {
            path: shown,
            cost: FileCost { single, inlined },
        });
    }

    info!(
        eligible = report.eligible.len(),
        binary = report.excluded_binary.len(),
        empty = report.excluded_empty.len(),
        non_code = report.excluded_non_code.len(),
        including = report.files_that_include,
        "discovery finished"
    );
    Ok(report)
}

/// Inlined sizes of included files, memoised per `(path, remaining depth)`.
struct CostCache {
    scanner: IncludeScanner,
    comment_marker: char,
    memo: HashMap<(PathBuf, usize), Option<FileSize>>,
}

impl CostCache {
    fn new(scanner: IncludeScanner, comment_marker: char) -> Self {
        Self {
            scanner,
            comment_marker,
            memo: HashMap::new(),
        }
    }

    /// Summed inlined size of everything `text` (the content of `path`)
    /// includes, with `depth` levels left.
    fn included(&mut self, path: &Path, text: &str, depth: usize) -> FileSize {
        let dir = path.parent().unwrap_or(Path::new(""));
        let mut total = FileSize::default();
        for include in self.scanner.includes(text) {
            if let Some(size) = self.inlined(&dir.join(include), depth) {
                total += size;
            }
        }
        total
    }

    /// Inlined size of `path`, or `None` when it cannot be read or the depth
    /// is exhausted.
    fn inlined(&mut self, path: &Path, depth: usize) -> Option<FileSize> {
        if depth == 0 {
            return None;
        }
        let key = (path.to_path_buf(), depth);
        if let Some(hit) = self.memo.get(&key) {
            return *hit;
        }

        let size = match read_text(path) {
            Ok((bytes, text)) => {
                let own = line_stats(bytes, &text, self.comment_marker);
                Some(own + self.included(path, &text, depth - 1))
            }
            Err(err) => {
                debug!(file = %path.display(), error = %format!("{err:#}"), "include not readable, counted as zero");
                None
            }
        };
        self.memo.insert(key, size);
        size
    }
}
