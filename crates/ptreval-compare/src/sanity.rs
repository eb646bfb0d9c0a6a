//! Plausibility checks over a comparison.
//!
//! None of these fail a run. Each finding is logged at `warn` and returned
//! so the report can list it.

use anyhow::Result;
use ptreval_format::{flatten, leaf_f64};
use ptreval_types::EvalSummarizedMeasurement;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::NamedComparison;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SanityKind {
    /// Side B overwrote fewer indices than side A.
    NegativeOverwrittenDiff,
    /// Side A, which is expected not to track indices, reported some.
    PositiveBaselineIndex,
    ZeroValue,
    NanDiff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanityWarning {
    pub kind: SanityKind,
    pub path: String,
    pub message: String,
}

/// Metric paths where zeros and NaN diffs are expected. A path is exempt
/// when it contains every fragment of one entry.
const EXPECTED_ZERO: &[&[&str]] = &[
    &["overwrittenIndices"],
    &["storedEnvIndices"],
    &["storedVertexIndices"],
    &["numberOfFunctionDefinitions-min"],
    &["numberOfFunctionDefinitions-median"],
    &["numberOfEdges", "diff"],
    &["numberOfCalls", "diff"],
    &["reduction", "diff"],
    &["reduction", "min"],
    &["dataflow", "min-diff"],
    &["timePerToken", "raw-min"],
];

fn exempt(name: &str) -> bool {
    EXPECTED_ZERO
        .iter()
        .any(|fragments| fragments.iter().all(|f| name.contains(f)))
}

/// Run every check over `comparison`.
pub fn check(comparison: &NamedComparison) -> Result<Vec<SanityWarning>> {
    let mut out = Vec::new();
    let dataflow = &comparison.eval.dataflow;
    let indices: [(&str, &EvalSummarizedMeasurement); 3] = [
        ("overwrittenIndices", &dataflow.overwritten_indices),
        ("storedVertexIndices", &dataflow.stored_vertex_indices),
        ("storedEnvIndices", &dataflow.stored_env_indices),
    ];
    for (metric, summary) in indices {
        for (stat, delta) in summary.statistics() {
            let path = format!("dataflow-{metric}-{stat}");
            if metric == "overwrittenIndices" && delta.diff < 0.0 {
                out.push(SanityWarning {
                    kind: SanityKind::NegativeOverwrittenDiff,
                    message: format!(
                        "{metric} {stat} diff from {} to {} is negative",
                        comparison.config_a, comparison.config_b
                    ),
                    path: path.clone(),
                });
            }
            if delta.value_a > 0.0 {
                out.push(SanityWarning {
                    kind: SanityKind::PositiveBaselineIndex,
                    message: format!(
                        "{metric} {stat} is positive for {}",
                        comparison.config_a
                    ),
                    path,
                });
            }
        }
    }

    for (path, leaf) in flatten(&comparison.eval)? {
        let name = path.join("-");
        if exempt(&name) {
            continue;
        }
        let Some(value) = leaf_f64(&leaf) else {
            continue;
        };
        if value == 0.0 {
            out.push(SanityWarning {
                kind: SanityKind::ZeroValue,
                message: format!("value for {name} is zero"),
                path: name,
            });
        } else if value.is_nan() && path.iter().any(|p| p == "diff") {
            out.push(SanityWarning {
                kind: SanityKind::NanDiff,
                message: format!("diff for {name} is NaN"),
                path: name,
            });
        }
    }

    for warning in &out {
        warn!(
            a = %comparison.config_a,
            b = %comparison.config_b,
            path = %warning.path,
            "[sanity] {}",
            warning.message
        );
    }
    Ok(out)
}
