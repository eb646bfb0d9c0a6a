//! # ptreval-format
//!
//! **Tier 3 (Formatting)**
//!
//! Rendering and serialization of `ptreval` receipts.
//!
//! ## What belongs here
//! * JSON and JSON Lines writers and readers
//! * The discovery and per-file summary CSV layouts
//! * Flattening nested reports into metric paths
//!
//! ## What does NOT belong here
//! * Calculating statistics
//! * CLI arg parsing

pub mod flatten;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use ptreval_types::{CatalogEntry, DiscoveryReport, FileSummary};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use flatten::{Leaf, column_name, flatten, leaf_f64};

pub const DISCOVERY_CSV_HEADER: [&str; 9] = [
    "path",
    "sourcedBytes",
    "singleBytes",
    "sourcedLines",
    "singleLines",
    "sourcedNonEmptyLines",
    "singleNonEmptyLines",
    "sourcedCodeLines",
    "singleCodeLines",
];

pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write `value` as one compact JSON Lines row.
pub fn write_json_line<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Discovery CSV: one row per eligible file, most expensive first.
pub fn write_discovery_csv<W: Write>(out: &mut W, report: &DiscoveryReport) -> Result<()> {
    let mut rows: Vec<&CatalogEntry> = report.eligible.iter().collect();
    rows.sort_by(|a, b| CatalogEntry::cost_order(a, b));

    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(DISCOVERY_CSV_HEADER)?;
    for entry in rows {
        let single = entry.cost.single;
        let inlined = entry.cost.inlined;
        wtr.write_record([
            entry.path.clone(),
            inlined.bytes.to_string(),
            single.bytes.to_string(),
            inlined.lines.to_string(),
            single.lines.to_string(),
            inlined.non_empty_lines.to_string(),
            single.non_empty_lines.to_string(),
            inlined.code_lines.to_string(),
            single.code_lines.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// The input manifest handed to the analysis tool: a JSON array of paths.
pub fn write_manifest(path: &Path, files: &[CatalogEntry]) -> Result<()> {
    let paths: Vec<&str> = files.iter().map(|e| e.path.as_str()).collect();
    write_json(path, &paths)
}

pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    read_json(path)
}

/// Per-file summaries as CSV, written one row at a time: a `file` and a
/// `runs` column followed by one column per flattened metric path of the
/// first summary. Later summaries must share that layout.
pub struct SummaryCsvWriter<W: Write> {
    wtr: csv::Writer<W>,
    columns: Option<Vec<String>>,
}

impl<W: Write> SummaryCsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            wtr: csv::WriterBuilder::new().has_headers(true).from_writer(out),
            columns: None,
        }
    }

    pub fn write(&mut self, summary: &FileSummary) -> Result<()> {
        let leaves = flatten(&summary.summary)?;
        let columns: Vec<String> = leaves.iter().map(|(path, _)| column_name(path)).collect();
        match &self.columns {
            None => {
                let mut header = vec!["file".to_string(), "runs".to_string()];
                header.extend(columns.iter().cloned());
                self.wtr.write_record(&header)?;
                self.columns = Some(columns);
            }
            Some(expected) => anyhow::ensure!(
                *expected == columns,
                "Summary for {} has a different metric layout",
                summary.file
            ),
        }
        let mut row = vec![summary.file.clone(), summary.runs.to_string()];
        row.extend(leaves.iter().map(|(_, leaf)| leaf.to_string()));
        self.wtr.write_record(&row)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptreval_types::{
        AggregateReport, CommonMeasurement, Count, FileCost, FileSize, SummarizedMeasurement,
    };

    fn entry(path: &str, single: u64, inlined: u64) -> CatalogEntry {
        let size = |bytes| FileSize {
            bytes,
            lines: 3,
            non_empty_lines: 2,
            code_lines: 1,
        };
        CatalogEntry {
            path: path.to_string(),
            cost: FileCost {
                single: size(single),
                inlined: size(inlined),
            },
        }
    }

    #[test]
    fn discovery_csv_sorts_by_inlined_cost() {
        let report = DiscoveryReport {
            eligible: vec![entry("small.R", 5, 5), entry("big, \"odd\".R", 10, 40)],
            ..Default::default()
        };
        let mut out = Vec::new();
        write_discovery_csv(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], DISCOVERY_CSV_HEADER.join(","));
        assert_eq!(lines[1], "\"big, \"\"odd\"\".R\",40,10,3,3,2,2,1,1");
        assert_eq!(lines[2], "small.R,5,5,3,3,2,2,1,1");
    }

    #[test]
    fn json_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/input.json");
        write_manifest(&path, &[entry("/a.R", 1, 1), entry("/b.R", 2, 2)]).unwrap();
        assert_eq!(read_manifest(&path).unwrap(), vec!["/a.R", "/b.R"]);
    }

    #[test]
    fn summary_csv_has_one_row_per_file() {
        let summary = |file: &str| FileSummary {
            file: file.to_string(),
            runs: 2,
            summary: AggregateReport {
                total_requests: Count(2),
                common_measurements: CommonMeasurement::ALL
                    .iter()
                    .map(|k| (*k, SummarizedMeasurement::default()))
                    .collect(),
                ..Default::default()
            },
        };
        let mut out = Vec::new();
        let mut csv = SummaryCsvWriter::new(&mut out);
        csv.write(&summary("a.R")).unwrap();
        csv.write(&summary("b.R")).unwrap();
        csv.finish().unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("file,runs,CommonMeasurementsLoadRequestMax,"));
        assert!(lines[0].contains(",CommonMeasurementsRetrieveAstMean,"));
        assert!(lines[0].ends_with(",TimesHitThreshold,TotalRequests,TotalSlices"));
        assert!(lines[1].starts_with("a.R,2,0.0,"));
        assert!(lines[1].ends_with(",0,2,0"));
    }

    #[test]
    fn json_lines_are_compact_rows() {
        let mut out = Vec::new();
        for row in [[1, 2], [3, 4]] {
            write_json_line(&mut out, &row).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "[1,2]\n[3,4]\n");
    }
}
