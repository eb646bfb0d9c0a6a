use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use ptreval_config as cli;
use ptreval_config::Profile;
use ptreval_format::{SummaryCsvWriter, read_manifest, write_json};
use ptreval_summarize::{file_summaries, summarize_file};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    INPUT_MANIFEST, RESULTS, SUMMARY, SUMMARY_CSV, SUMMARY_PER_FILE, SUMMARY_STATS, config_dir,
    write_file,
};
use crate::progress::Progress;
use crate::timings;

/// Tallies for one configuration's reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryStats {
    pub records: u64,
    pub files: u64,
    pub skipped_lines: u64,
    /// Files in the configuration's input manifest, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_files: Option<u64>,
}

pub(crate) fn handle(
    args: cli::SummarizeArgs,
    global: &cli::GlobalArgs,
    profile: &Profile,
) -> Result<()> {
    let started = Instant::now();
    let configs = match &args.config {
        Some(name) => {
            if profile.config(name).is_none() {
                bail!(
                    "Unknown configuration '{name}' in profile '{}' (available: {})",
                    profile.name,
                    profile.config_names().join(", ")
                );
            }
            vec![name.clone()]
        }
        None => profile.config_names(),
    };

    let progress = Progress::new(!global.no_progress);
    for config in &configs {
        progress.set_message(format!("Summarizing {config}"));
        let config_started = Instant::now();
        let stats = summarize_config(&args.out, config)?;
        timings::record(
            &args.out,
            &format!("summarize-{config}"),
            config_started.elapsed(),
        )?;
        println!(
            "{config}: {} records over {} files ({} malformed lines skipped)",
            stats.records, stats.files, stats.skipped_lines
        );
    }
    progress.finish_and_clear();

    timings::record(&args.out, "summarize", started.elapsed())
}

fn summarize_config(out: &Path, config: &str) -> Result<SummaryStats> {
    let dir = config_dir(out, config);
    let input = dir.join(RESULTS);
    let per_file = dir.join(SUMMARY_PER_FILE);

    let outcome = summarize_file(&input, Some(&per_file))
        .with_context(|| format!("Failed to summarize {}", input.display()))?;
    if outcome.skipped_lines > 0 {
        warn!(
            config,
            skipped = outcome.skipped_lines,
            "malformed measurement lines were skipped"
        );
    }
    write_json(&dir.join(SUMMARY), &outcome.report)?;

    let summaries = file_summaries(&per_file)
        .with_context(|| format!("Failed to read {}", per_file.display()))?;
    write_file(&dir.join(SUMMARY_CSV), |w| {
        let mut csv = SummaryCsvWriter::new(w);
        for summary in summaries {
            csv.write(&summary?)?;
        }
        csv.finish()
    })?;

    let manifest = dir.join(INPUT_MANIFEST);
    let manifest_files = if manifest.is_file() {
        let files = read_manifest(&manifest)?.len() as u64;
        if outcome.files < files {
            warn!(
                config,
                manifest = files,
                measured = outcome.files,
                "some input files have no measurements"
            );
        }
        Some(files)
    } else {
        None
    };

    let stats = SummaryStats {
        records: outcome.records,
        files: outcome.files,
        skipped_lines: outcome.skipped_lines,
        manifest_files,
    };
    write_json(&dir.join(SUMMARY_STATS), &stats)?;
    Ok(stats)
}
