pub(crate) mod compare;
pub(crate) mod completions;
pub(crate) mod discover;
pub(crate) mod distribute;
pub(crate) mod report;
pub(crate) mod summarize;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ptreval_config as cli;

// Output layout, relative to `--out`.
pub(crate) const DISCOVER_JSON: &str = "discover.json";
pub(crate) const DISCOVER_CSV: &str = "discover.csv";
pub(crate) const DISCOVER_STATS: &str = "discover-stats.json";
pub(crate) const REPO_INFO: &str = "repo-info.json";
pub(crate) const DISTRIBUTION: &str = "distribution.json";
pub(crate) const REPORT: &str = "report.json";
pub(crate) const COMPARE_DIR: &str = "compare";

// Per configuration.
pub(crate) const INPUT_MANIFEST: &str = "input.json";
pub(crate) const TOOL_ARGS: &str = "tool-args.json";
pub(crate) const RESULTS: &str = "results.jsonl";
pub(crate) const SUMMARY: &str = "summary.json";
pub(crate) const SUMMARY_PER_FILE: &str = "summary-per-file.jsonl";
pub(crate) const SUMMARY_CSV: &str = "summary.csv";
pub(crate) const SUMMARY_STATS: &str = "summary-stats.json";

// Per comparison.
pub(crate) const EVAL: &str = "eval.json";
pub(crate) const SANITY: &str = "sanity.json";
pub(crate) const PER_FILE: &str = "per-file.jsonl";
pub(crate) const PER_FILE_STATS: &str = "per-file-stats.json";

pub(crate) fn config_dir(out: &Path, config: &str) -> PathBuf {
    out.join(config)
}

pub(crate) fn comparison_dir(out: &Path, slug: &str) -> PathBuf {
    out.join(COMPARE_DIR).join(slug)
}

/// Create `path` (and its parents) and hand a buffered writer to `write`.
pub(crate) fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(&mut out).with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub(crate) fn dispatch(cli: cli::Cli) -> Result<()> {
    let global = &cli.global;
    let profile = || crate::config::resolve_profile(global);
    match cli.command {
        cli::Commands::Completions(args) => completions::handle(args),
        cli::Commands::Discover(args) => discover::handle(args, global, &profile()?),
        cli::Commands::Distribute(args) => distribute::handle(args, global, &profile()?),
        cli::Commands::Summarize(args) => summarize::handle(args, global, &profile()?),
        cli::Commands::Compare(args) => compare::handle(args, global, &profile()?),
        cli::Commands::Report(args) => report::handle(args, &profile()?),
    }
}
