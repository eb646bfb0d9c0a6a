//! BDD-style scenario tests for ptreval-summarize.

use std::io::Cursor;

use ptreval_summarize::summarize_reader;
use ptreval_types::{
    Count, MeasurementRecord, PerSliceMeasurement, Sample, SummarizedMeasurement,
};

fn record(file: &str, slice_ms: f64) -> String {
    let mut record = MeasurementRecord {
        file: file.to_string(),
        slices: 1,
        ..Default::default()
    };
    record
        .per_slice
        .insert(PerSliceMeasurement::StaticSlicing, Sample(slice_ms));
    record.input.number_of_tokens = Sample(100.0);
    record.reduction.number_of_lines = Sample(0.25);
    record.reduction_no_fluff.number_of_lines = Sample(0.5);
    serde_json::to_string(&record).unwrap()
}

#[test]
fn given_three_slice_times_when_summarized_then_statistics_match() {
    // Given three files with slice times 120, 80 and 200 ms
    let input = [record("a", 120.0), record("b", 80.0), record("c", 200.0)].join("\n");

    // When the stream is summarized
    let outcome = summarize_reader(Cursor::new(input), None).unwrap();

    // Then the slicing summary has the expected statistics
    let slicing = outcome
        .report
        .per_slice_measurements
        .get(&PerSliceMeasurement::StaticSlicing)
        .unwrap();
    assert_eq!(slicing.min, 80.0);
    assert_eq!(slicing.max, 200.0);
    assert!((slicing.mean - 133.333).abs() < 1e-3);
    assert_eq!(slicing.median, 120.0);
    assert_eq!(slicing.total, 400.0);
    // And slicing time per token is derived from the same samples
    assert!((outcome.report.time_per_token.slice.normalized.total - 4.0).abs() < 1e-9);
}

#[test]
fn given_no_records_when_summarized_then_every_summary_is_zero() {
    let outcome = summarize_reader(Cursor::new(""), None).unwrap();

    assert_eq!(outcome.records, 0);
    assert_eq!(outcome.report.total_requests, Count(0));
    for (_, summary) in &outcome.report.per_slice_measurements {
        assert_eq!(*summary, SummarizedMeasurement::default());
    }
    assert_eq!(outcome.report.dataflow.number_of_nodes, SummarizedMeasurement::default());
}

#[test]
fn given_reduction_with_and_without_fluff_when_summarized_then_both_are_kept_apart() {
    let input = [record("a", 1.0), record("b", 1.0)].join("\n");

    let outcome = summarize_reader(Cursor::new(input), None).unwrap();

    assert_eq!(outcome.report.reduction.number_of_lines.mean, 0.25);
    assert_eq!(outcome.report.reduction_no_fluff.number_of_lines.mean, 0.5);
}

#[test]
fn given_interleaved_files_when_summarized_then_each_run_of_a_file_is_flushed() {
    // Given records a, b, a (not consecutive)
    let input = [record("a", 1.0), record("b", 2.0), record("a", 3.0)].join("\n");
    let mut sink = Vec::new();

    // When summarized
    let outcome = summarize_reader(Cursor::new(input), Some(&mut sink)).unwrap();

    // Then three per-file lines are written, one per run of consecutive records
    assert_eq!(outcome.files, 3);
    assert_eq!(String::from_utf8(sink).unwrap().lines().count(), 3);
}
