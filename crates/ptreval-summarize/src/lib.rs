//! # ptreval-summarize
//!
//! **Tier 1 (Reduction)**
//!
//! Folds the measurement records of one configuration into one
//! [`AggregateReport`], reading JSON Lines one record at a time.
//!
//! Every leaf metric keeps its samples in an [`Accumulator`]; summaries are
//! computed from the sorted samples, so the result does not depend on the
//! order records arrive in. Consecutive records of the same file are also
//! reduced on their own and streamed out as [`FileSummary`] lines.
//!
//! ## What belongs here
//! * Sample accumulation and the six-statistic reduction
//! * Time-per-token derivation
//! * Per-file grouping and reading per-file logs back
//!
//! ## What does NOT belong here
//! * Comparing summaries (use ptreval-compare)
//! * Output layout (use the CLI)

mod accumulator;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ptreval_types::{AggregateReport, FileSummary, MeasurementRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use accumulator::{Accumulator, ReportAccumulator};

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read measurement line {line}")]
    ReadLine {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write per-file summary")]
    Write(#[source] std::io::Error),

    #[error("Failed to encode per-file summary")]
    Encode(#[source] serde_json::Error),
}

/// Result of reducing one stream of records.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub report: AggregateReport,
    pub records: u64,
    pub files: u64,
    /// Non-blank lines that did not parse as a record.
    pub skipped_lines: u64,
}

/// Reduce every record in `reader`.
///
/// When `per_file` is given, one [`FileSummary`] line is written and flushed
/// for each run of consecutive records that share a file.
pub fn summarize_reader<R: BufRead>(
    reader: R,
    mut per_file: Option<&mut dyn Write>,
) -> Result<SummaryOutcome, SummarizeError> {
    let mut total = ReportAccumulator::default();
    let mut current: Option<(String, ReportAccumulator)> = None;
    let mut records = 0u64;
    let mut files = 0u64;
    let mut skipped_lines = 0u64;

    let mut lines = ByteLines::new(reader);
    while let Some((line_no, line)) = lines.next_line()? {
        let record: MeasurementRecord = match serde_json::from_slice(line) {
            Ok(record) => record,
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping malformed measurement line");
                skipped_lines += 1;
                continue;
            }
        };

        records += 1;
        total.add(&record);

        let same_file = matches!(&current, Some((file, _)) if *file == record.file);
        if !same_file {
            if let Some((file, acc)) = current.take() {
                flush_file(&mut per_file, file, &acc)?;
            }
            files += 1;
            current = Some((record.file.clone(), ReportAccumulator::default()));
        }
        if let Some((_, acc)) = current.as_mut() {
            acc.add(&record);
        }
    }
    if let Some((file, acc)) = current.take() {
        flush_file(&mut per_file, file, &acc)?;
    }

    info!(records, files, skipped_lines, "summarized measurements");
    Ok(SummaryOutcome {
        report: total.finish(),
        records,
        files,
        skipped_lines,
    })
}

fn flush_file(
    sink: &mut Option<&mut dyn Write>,
    file: String,
    acc: &ReportAccumulator,
) -> Result<(), SummarizeError> {
    let Some(sink) = sink.as_deref_mut() else {
        return Ok(());
    };
    let summary = FileSummary {
        file,
        runs: acc.records(),
        summary: acc.finish(),
    };
    debug!(file = %summary.file, runs = summary.runs, "per-file summary");
    serde_json::to_writer(&mut *sink, &summary).map_err(SummarizeError::Encode)?;
    sink.write_all(b"\n").map_err(SummarizeError::Write)?;
    sink.flush().map_err(SummarizeError::Write)
}

/// Reduce the records in `input`, writing per-file summaries to
/// `per_file_out` when given.
pub fn summarize_file(
    input: &Path,
    per_file_out: Option<&Path>,
) -> Result<SummaryOutcome, SummarizeError> {
    let reader = File::open(input).map_err(|source| SummarizeError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(reader);

    match per_file_out {
        Some(out) => {
            let file = File::create(out).map_err(SummarizeError::Write)?;
            let mut writer = BufWriter::new(file);
            summarize_reader(reader, Some(&mut writer))
        }
        None => summarize_reader(reader, None),
    }
}

/// Non-blank lines of a JSON Lines stream, read as raw bytes so that a
/// line with invalid UTF-8 is a decode failure rather than a read failure.
struct ByteLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: BufRead> ByteLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<(u64, &[u8])>, SummarizeError> {
        loop {
            self.buf.clear();
            self.line_no += 1;
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .map_err(|source| SummarizeError::ReadLine {
                    line: self.line_no,
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            if !self.buf.trim_ascii().is_empty() {
                return Ok(Some((self.line_no, self.buf.trim_ascii())));
            }
        }
    }
}

/// Streaming reader over a per-file summary log. Malformed lines are logged
/// and skipped.
pub struct FileSummaries<R> {
    lines: ByteLines<R>,
    source: String,
}

impl<R: BufRead> FileSummaries<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: ByteLines::new(reader),
            source: source.into(),
        }
    }
}

impl<R: BufRead> Iterator for FileSummaries<R> {
    type Item = Result<FileSummary, SummarizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line_no, line) = match self.lines.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            };
            match serde_json::from_slice::<FileSummary>(line) {
                Ok(summary) => return Some(Ok(summary)),
                Err(err) => warn!(
                    file = %self.source,
                    line = line_no,
                    error = %err,
                    "skipping malformed per-file summary"
                ),
            }
        }
    }
}

/// Open a per-file summary log for streaming.
pub fn file_summaries(path: &Path) -> Result<FileSummaries<BufReader<File>>, SummarizeError> {
    let file = File::open(path).map_err(|source| SummarizeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FileSummaries::new(
        BufReader::new(file),
        path.display().to_string(),
    ))
}
