//! # ptreval-types
//!
//! **Tier 0 (Core Types)**
//!
//! This crate defines the core data structures and contracts for `ptreval`:
//! the discovery catalog, the raw per-file measurement records produced by
//! the analysis tool, the aggregate reports reduced from them and the delta
//! records produced when two aggregates are compared.
//!
//! ## Stability Policy
//!
//! **JSON-first stability**: the primary contract is the JSON shape, not Rust
//! struct literals. Removed or renamed fields bump [`SCHEMA_VERSION`].
//!
//! ## What belongs here
//! * Pure data structs (catalog, records, reports, receipts)
//! * Serialization/Deserialization logic, including the non-finite float codec
//! * Stability markers (SCHEMA_VERSION)
//!
//! ## What does NOT belong here
//! * File I/O
//! * CLI argument parsing
//! * Statistics or comparison logic

pub mod float;
mod metrics;

use std::cmp::Ordering;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

pub use metrics::{
    AggregateReport, CommonMeasurement, Count, DataflowMetrics, FileSummary, InputMetrics,
    MeasurementMap, MeasurementRecord, PerSliceMeasurement, ReductionMetrics, Sample,
    SummarizedMeasurement, TimePerToken, TimePerTokenMetrics,
};

/// The current schema version for all receipt types.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl ToolInfo {
    pub fn current() -> Self {
        Self {
            name: "ptreval".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// -----------------------
// Discovery
// -----------------------

/// Size of one file, or of a file with its includes inlined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSize {
    pub bytes: u64,
    pub lines: u64,
    pub non_empty_lines: u64,
    pub code_lines: u64,
}

impl Add for FileSize {
    type Output = FileSize;

    fn add(self, rhs: FileSize) -> FileSize {
        FileSize {
            bytes: self.bytes + rhs.bytes,
            lines: self.lines + rhs.lines,
            non_empty_lines: self.non_empty_lines + rhs.non_empty_lines,
            code_lines: self.code_lines + rhs.code_lines,
        }
    }
}

impl AddAssign for FileSize {
    fn add_assign(&mut self, rhs: FileSize) {
        *self = *self + rhs;
    }
}

/// Own size and size with every include inlined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileCost {
    pub single: FileSize,
    pub inlined: FileSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub path: String,
    pub cost: FileCost,
}

impl CatalogEntry {
    /// Order used wherever a catalog is sorted: most expensive first by
    /// inlined bytes, ties broken by path.
    pub fn cost_order(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
        b.cost
            .inlined
            .bytes
            .cmp(&a.cost.inlined.bytes)
            .then_with(|| a.path.cmp(&b.path))
    }
}

/// Result of walking a source tree.
///
/// `eligible` and the three `excluded_*` lists partition every file whose
/// extension matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub eligible: Vec<CatalogEntry>,
    pub excluded_binary: Vec<String>,
    pub excluded_empty: Vec<String>,
    pub excluded_non_code: Vec<String>,
    /// Number of eligible files that include at least one other file.
    pub files_that_include: u64,
}

impl DiscoveryReport {
    pub fn matched(&self) -> usize {
        self.eligible.len()
            + self.excluded_binary.len()
            + self.excluded_empty.len()
            + self.excluded_non_code.len()
    }

    pub fn stats(&self) -> DiscoveryStats {
        let total = self
            .eligible
            .iter()
            .fold(FileCost::default(), |mut acc, entry| {
                acc.single += entry.cost.single;
                acc.inlined += entry.cost.inlined;
                acc
            });
        DiscoveryStats {
            matched: self.matched() as u64,
            eligible: self.eligible.len() as u64,
            excluded_binary: self.excluded_binary.len() as u64,
            excluded_empty: self.excluded_empty.len() as u64,
            excluded_non_code: self.excluded_non_code.len() as u64,
            files_that_include: self.files_that_include,
            total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryStats {
    pub matched: u64,
    pub eligible: u64,
    pub excluded_binary: u64,
    pub excluded_empty: u64,
    pub excluded_non_code: u64,
    pub files_that_include: u64,
    pub total: FileCost,
}

// -----------------------
// Distribution
// -----------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSummary {
    pub config: String,
    pub files: u64,
    pub single_bytes: u64,
    pub inlined_bytes: u64,
}

/// Written next to the per-configuration manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReceipt {
    pub schema_version: u32,
    pub tool: ToolInfo,
    pub seed: String,
    pub bucket_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub buckets: Vec<BucketSummary>,
}

// -----------------------
// Comparison leaves
// -----------------------

/// Two values of a pure count, side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPair {
    pub value_a: u64,
    pub value_b: u64,
}

/// Difference between two values `a` and `b`.
///
/// `diff = b - a`, `diff_relative = diff / a`, `factor = b / a`. A zero `a`
/// yields IEEE NaN or infinity, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalDelta {
    #[serde(with = "float")]
    pub value_a: f64,
    #[serde(with = "float")]
    pub value_b: f64,
    #[serde(with = "float")]
    pub diff: f64,
    #[serde(with = "float")]
    pub diff_relative: f64,
    #[serde(with = "float")]
    pub factor: f64,
}

impl EvalDelta {
    pub fn new(a: f64, b: f64) -> Self {
        let diff = b - a;
        Self {
            value_a: a,
            value_b: b,
            diff,
            diff_relative: diff / a,
            factor: b / a,
        }
    }

    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("valueA", self.value_a),
            ("valueB", self.value_b),
            ("diff", self.diff),
            ("diffRelative", self.diff_relative),
            ("factor", self.factor),
        ]
    }
}

/// One [`EvalDelta`] per summary statistic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalSummarizedMeasurement {
    pub min: EvalDelta,
    pub max: EvalDelta,
    pub mean: EvalDelta,
    pub median: EvalDelta,
    pub std: EvalDelta,
    pub total: EvalDelta,
}

impl EvalSummarizedMeasurement {
    pub fn statistics(&self) -> [(&'static str, &EvalDelta); 6] {
        [
            ("min", &self.min),
            ("max", &self.max),
            ("mean", &self.mean),
            ("median", &self.median),
            ("std", &self.std),
            ("total", &self.total),
        ]
    }
}

// -----------------------
// Environment
// -----------------------

/// Identity of the analysed source repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub tag: Option<String>,
    pub commit: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub cpu: String,
    pub cores: usize,
    #[serde(rename = "memoryGB", with = "float")]
    pub memory_gb: f64,
    pub os_version: String,
    pub runtime_version: String,
}
