use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use ptreval_compare::{NamedComparison, PerFileComparison, SanityWarning};
use ptreval_config as cli;
use ptreval_config::Profile;
use ptreval_format::{now_ms, read_json, write_json};
use ptreval_types::{
    DiscoveryStats, DistributionReceipt, HostInfo, RepoInfo, SCHEMA_VERSION, ToolInfo,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::summarize::SummaryStats;
use super::{
    DISCOVER_STATS, DISTRIBUTION, EVAL, PER_FILE_STATS, REPO_INFO, REPORT, SANITY,
    SUMMARY_STATS, comparison_dir, config_dir,
};
use crate::host::host_info;
use crate::timings::{self, Timings};

/// A single comparison is inlined; more configurations give a list.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Comparisons {
    Single(Box<NamedComparison>),
    Pairwise(Vec<NamedComparison>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonWarnings {
    config_a: String,
    config_b: String,
    warnings: Vec<SanityWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonTally {
    config_a: String,
    config_b: String,
    #[serde(flatten)]
    tally: PerFileComparison,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationReport {
    schema_version: u32,
    generated_at_ms: u128,
    tool: ToolInfo,
    profile: Profile,
    repo: Option<RepoInfo>,
    host: HostInfo,
    discovery: Option<DiscoveryStats>,
    distribution: Option<DistributionReceipt>,
    summaries: BTreeMap<String, SummaryStats>,
    comparisons: Comparisons,
    sanity: Vec<ComparisonWarnings>,
    per_file: Vec<ComparisonTally>,
    times: Timings,
}

/// Read `path` when it exists; stages that were skipped leave no file.
fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.is_file() {
        debug!(path = %path.display(), "optional report input missing");
        return Ok(None);
    }
    read_json(path).map(Some)
}

pub(crate) fn handle(args: cli::ReportArgs, profile: &Profile) -> Result<()> {
    let started = Instant::now();
    let out = &args.out;

    let mut summaries = BTreeMap::new();
    for config in profile.config_names() {
        if let Some(stats) = read_optional(&config_dir(out, &config).join(SUMMARY_STATS))? {
            summaries.insert(config, stats);
        }
    }

    let names = profile.config_names();
    let pairs = names
        .iter()
        .enumerate()
        .flat_map(|(i, a)| names[i + 1..].iter().map(move |b| (a.clone(), b.clone())));
    let mut comparisons = Vec::new();
    let mut sanity = Vec::new();
    let mut per_file = Vec::new();
    for (config_a, config_b) in pairs {
        let dir = comparison_dir(out, &format!("{config_a}--{config_b}"));
        let eval = dir.join(EVAL);
        let comparison: NamedComparison = read_json(&eval)
            .with_context(|| format!("Failed to read comparison {}", eval.display()))?;
        comparisons.push(comparison);

        let warnings: Vec<SanityWarning> = read_optional(&dir.join(SANITY))?.unwrap_or_default();
        sanity.push(ComparisonWarnings {
            config_a: config_a.clone(),
            config_b: config_b.clone(),
            warnings,
        });
        if let Some(tally) = read_optional(&dir.join(PER_FILE_STATS))? {
            per_file.push(ComparisonTally {
                config_a,
                config_b,
                tally,
            });
        }
    }

    let comparisons = match <[NamedComparison; 1]>::try_from(comparisons) {
        Ok([single]) => Comparisons::Single(Box::new(single)),
        Err(all) => Comparisons::Pairwise(all),
    };

    let report = EvaluationReport {
        schema_version: SCHEMA_VERSION,
        generated_at_ms: now_ms(),
        tool: ToolInfo::current(),
        profile: profile.clone(),
        repo: read_optional(&out.join(REPO_INFO))?,
        host: host_info(),
        discovery: read_optional(&out.join(DISCOVER_STATS))?,
        distribution: read_optional(&out.join(DISTRIBUTION))?,
        summaries,
        comparisons,
        sanity,
        per_file,
        times: timings::load(out)?,
    };
    let path = out.join(REPORT);
    write_json(&path, &report)?;

    timings::record(out, "report", started.elapsed())?;
    println!("Wrote {}", path.display());
    Ok(())
}
