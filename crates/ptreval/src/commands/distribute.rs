use std::time::Instant;

use anyhow::{Context, Result};
use ptreval_config as cli;
use ptreval_config::Profile;
use ptreval_distribute::{assign, distribute, receipt, seeded_rng};
use ptreval_format::{read_json, write_json, write_manifest};
use ptreval_types::DiscoveryReport;

use super::{DISCOVER_JSON, DISTRIBUTION, INPUT_MANIFEST, TOOL_ARGS, config_dir};
use crate::progress::Progress;
use crate::{config, timings};

pub(crate) fn handle(
    args: cli::DistributeArgs,
    global: &cli::GlobalArgs,
    profile: &Profile,
) -> Result<()> {
    let started = Instant::now();
    let settings = config::resolve_distribute(&args, profile);
    let discovery = args
        .discovery
        .clone()
        .unwrap_or_else(|| args.out.join(DISCOVER_JSON));
    let report: DiscoveryReport = read_json(&discovery)
        .with_context(|| format!("Failed to read discovery report {}", discovery.display()))?;

    let progress = Progress::new(!global.no_progress);
    progress.set_message(format!(
        "Distributing {} files into {} buckets",
        report.eligible.len(),
        settings.buckets
    ));

    let mut rng = seeded_rng(&settings.seed);
    let buckets = distribute(&report.eligible, settings.buckets, &mut rng)
        .context("Failed to distribute the catalog")?;
    let assignments = assign(buckets, &profile.config_names(), settings.limit)
        .context("Failed to assign buckets to configurations")?;

    for assignment in &assignments {
        let dir = config_dir(&args.out, &assignment.config);
        write_manifest(&dir.join(INPUT_MANIFEST), &assignment.files)?;
        if let Some(config) = profile.config(&assignment.config) {
            write_json(&dir.join(TOOL_ARGS), &profile.tool_args_for(config))?;
        }
    }
    let receipt = receipt(&assignments, &settings.seed, settings.buckets, settings.limit);
    write_json(&args.out.join(DISTRIBUTION), &receipt)?;
    progress.finish_and_clear();

    timings::record(&args.out, "distribute", started.elapsed())?;
    for bucket in &receipt.buckets {
        println!(
            "{}: {} files, {} bytes ({} with includes)",
            bucket.config, bucket.files, bucket.single_bytes, bucket.inlined_bytes
        );
    }
    Ok(())
}
