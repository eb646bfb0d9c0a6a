//! # ptreval-walk
//!
//! **Tier 2 (Utilities)**
//!
//! Corpus traversal. Lists every regular file under a root whose extension
//! is in a configured set. Unlike a repository scan, a corpus is walked in
//! full: hidden files and ignore files do not hide anything.
//!
//! ## What belongs here
//! * Filesystem traversal
//! * Extension filtering
//!
//! ## What does NOT belong here
//! * Content inspection (use ptreval-content)
//! * Cost computation (use ptreval-discover)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use tracing::debug;

/// Extensions of the default corpus language.
pub const DEFAULT_EXTENSIONS: &[&str] = &["r", "R"];

/// True when `path` has one of `extensions` (compared case-sensitively).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want == ext))
}

/// List matching files under `root`, sorted by path.
///
/// Returned paths are `root` joined with the relative path, so they are
/// absolute whenever `root` is. Any traversal error (an unreadable
/// directory, a vanished entry) aborts the listing.
pub fn list_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false);
    builder.follow_links(false);

    for entry in builder.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if has_extension(path, extensions) {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    debug!(root = %root.display(), files = files.len(), "walked corpus");
    Ok(files)
}
