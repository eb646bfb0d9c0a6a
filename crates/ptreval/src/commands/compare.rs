use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use ptreval_compare::{
    NamedComparison, PerFileComparison, compare_configs, compare_per_file, sanity,
};
use ptreval_config as cli;
use ptreval_config::Profile;
use ptreval_format::{read_json, write_json, write_json_line};
use ptreval_summarize::{FileSummaries, file_summaries};
use ptreval_types::AggregateReport;
use tracing::warn;

use super::{
    EVAL, PER_FILE, PER_FILE_STATS, SANITY, SUMMARY, SUMMARY_PER_FILE, comparison_dir,
    config_dir, write_file,
};
use crate::progress::Progress;
use crate::{config, timings};

pub(crate) fn handle(
    args: cli::CompareArgs,
    global: &cli::GlobalArgs,
    profile: &Profile,
) -> Result<()> {
    let started = Instant::now();
    let per_file = config::per_file_comparison(&args, profile);
    let progress = Progress::new(!global.no_progress);

    let mut reports = Vec::new();
    for name in profile.config_names() {
        let path = config_dir(&args.out, &name).join(SUMMARY);
        let report: AggregateReport = read_json(&path)
            .with_context(|| format!("Failed to read summary {}", path.display()))?;
        reports.push((name, report));
    }
    if reports.len() < 2 {
        warn!(
            profile = %profile.name,
            "fewer than two configurations, nothing to compare"
        );
    }

    progress.set_message("Comparing configurations");
    for comparison in compare_configs(&reports) {
        let dir = comparison_dir(&args.out, &comparison.slug());
        write_json(&dir.join(EVAL), &comparison)?;
        let warnings = sanity::check(&comparison)?;
        write_json(&dir.join(SANITY), &warnings)?;

        let mut line = format!(
            "{} vs {}: {} sanity warnings",
            comparison.config_a,
            comparison.config_b,
            warnings.len()
        );
        if per_file {
            progress.set_message(format!("Comparing {} file by file", comparison.slug()));
            let tally = compare_files(&args.out, &dir, &comparison)?;
            line.push_str(&format!(
                ", {} files compared, {} not compared",
                tally.compared, tally.not_compared
            ));
        }
        println!("{line}");
    }
    progress.finish_and_clear();

    timings::record(&args.out, "compare", started.elapsed())
}

fn open_file_summaries(out: &Path, config: &str) -> Result<FileSummaries<BufReader<File>>> {
    let path = config_dir(out, config).join(SUMMARY_PER_FILE);
    file_summaries(&path).with_context(|| format!("Failed to read {}", path.display()))
}

fn compare_files(
    out: &Path,
    dir: &Path,
    comparison: &NamedComparison,
) -> Result<PerFileComparison> {
    let a = open_file_summaries(out, &comparison.config_a)?;
    let b = open_file_summaries(out, &comparison.config_b)?;

    let mut tally = PerFileComparison::default();
    write_file(&dir.join(PER_FILE), |w| {
        tally = compare_per_file(
            a.map(|s| s.map_err(anyhow::Error::from)),
            b.map(|s| s.map_err(anyhow::Error::from)),
            |row| write_json_line(w, &row),
        )?;
        Ok(())
    })?;
    write_json(&dir.join(PER_FILE_STATS), &tally)?;
    Ok(tally)
}
