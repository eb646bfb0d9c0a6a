use std::time::Instant;

use anyhow::{Context, Result};
use ptreval_config as cli;
use ptreval_config::Profile;
use ptreval_format::{write_discovery_csv, write_json};

use super::{DISCOVER_CSV, DISCOVER_JSON, DISCOVER_STATS, REPO_INFO, write_file};
use crate::progress::Progress;
use crate::{config, timings};

pub(crate) fn handle(
    args: cli::DiscoverArgs,
    global: &cli::GlobalArgs,
    profile: &Profile,
) -> Result<()> {
    let started = Instant::now();
    let options = config::resolve_discover(&args, profile);
    let progress = Progress::new(!global.no_progress);
    progress.set_message(format!("Discovering {}", args.source.display()));

    let report = ptreval_discover::discover(&args.source, &options)
        .with_context(|| format!("Failed to discover corpus under {}", args.source.display()))?;

    progress.set_message("Writing catalog");
    write_json(&args.out.join(DISCOVER_JSON), &report)?;
    write_file(&args.out.join(DISCOVER_CSV), |out| {
        write_discovery_csv(out, &report)
    })?;
    let stats = report.stats();
    write_json(&args.out.join(DISCOVER_STATS), &stats)?;
    write_json(
        &args.out.join(REPO_INFO),
        &ptreval_git::repo_info(&args.source),
    )?;
    progress.finish_and_clear();

    timings::record(&args.out, "discover", started.elapsed())?;
    println!(
        "Discovered {} eligible of {} matching files ({} include others) -> {}",
        stats.eligible,
        stats.matched,
        stats.files_that_include,
        args.out.display()
    );
    Ok(())
}
