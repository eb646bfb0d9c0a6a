//! File-by-file comparison of two per-file summary logs.

use std::collections::BTreeMap;

use ptreval_types::FileSummary;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Compare, EvalReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileComparison {
    pub file: String,
    pub runs_a: u64,
    pub runs_b: u64,
    pub eval: EvalReport,
}

/// Counts of a file-by-file comparison. The per-file deltas themselves are
/// handed to the caller as they are produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerFileComparison {
    pub compared: u64,
    /// Files present in only one of the two logs.
    pub not_compared: u64,
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
}

fn index<E>(
    side: &str,
    summaries: impl IntoIterator<Item = Result<FileSummary, E>>,
) -> Result<BTreeMap<String, FileSummary>, E> {
    let mut out = BTreeMap::new();
    for summary in summaries {
        let summary = summary?;
        if let Some(previous) = out.insert(summary.file.clone(), summary) {
            warn!(side, file = %previous.file, "file summarized more than once, keeping the last summary");
        }
    }
    Ok(out)
}

/// Compare the files both logs summarize, passing each [`FileComparison`]
/// to `emit` in file order; files in only one log are counted as not
/// compared.
pub fn compare_per_file<E>(
    a: impl IntoIterator<Item = Result<FileSummary, E>>,
    b: impl IntoIterator<Item = Result<FileSummary, E>>,
    mut emit: impl FnMut(FileComparison) -> Result<(), E>,
) -> Result<PerFileComparison, E> {
    let a = index("a", a)?;
    let mut b = index("b", b)?;
    let mut out = PerFileComparison::default();

    for (file, summary_a) in a {
        match b.remove(&file) {
            Some(summary_b) => {
                emit(FileComparison {
                    eval: summary_a.summary.compare(&summary_b.summary),
                    runs_a: summary_a.runs,
                    runs_b: summary_b.runs,
                    file,
                })?;
                out.compared += 1;
            }
            None => out.only_in_a.push(file),
        }
    }
    out.only_in_b = b.into_keys().collect();
    out.not_compared = (out.only_in_a.len() + out.only_in_b.len()) as u64;

    info!(
        compared = out.compared,
        not_compared = out.not_compared,
        "compared file by file"
    );
    Ok(out)
}
