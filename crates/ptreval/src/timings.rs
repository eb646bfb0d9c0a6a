//! Stage timings kept in `<out>/times.json`.
//!
//! Every command adds or replaces its own entries, so the file accumulates
//! the timings of a whole evaluation across separate invocations.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use ptreval_format::{now_ms, read_json, write_json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub(crate) const TIMES_FILE: &str = "times.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StageTime {
    pub duration_ms: u64,
    pub finished_at_ms: u128,
}

pub(crate) type Timings = BTreeMap<String, StageTime>;

/// Timings recorded so far; empty when the file does not exist yet.
pub(crate) fn load(out: &Path) -> Result<Timings> {
    let path = out.join(TIMES_FILE);
    if !path.is_file() {
        return Ok(Timings::new());
    }
    read_json(&path)
}

pub(crate) fn record(out: &Path, stage: &str, elapsed: Duration) -> Result<()> {
    let mut timings = load(out).unwrap_or_else(|err| {
        warn!(error = %format!("{err:#}"), "discarding unreadable {TIMES_FILE}");
        Timings::new()
    });
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    info!(stage, duration_ms, "finished stage");
    timings.insert(
        stage.to_string(),
        StageTime {
            duration_ms,
            finished_at_ms: now_ms(),
        },
    );
    write_json(&out.join(TIMES_FILE), &timings)
}
