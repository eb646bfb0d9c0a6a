//! BDD-style scenario tests for ptreval-types.
//!
//! Each test follows Given/When/Then structure to verify the JSON shapes the
//! rest of the pipeline reads and writes.

use ptreval_types::{
    AggregateReport, CommonMeasurement, Count, DiscoveryReport, EvalDelta, MeasurementRecord,
    PerSliceMeasurement, RawPair, SCHEMA_VERSION, Sample, ToolInfo,
};

#[test]
fn schema_version_is_current() {
    assert_eq!(SCHEMA_VERSION, 1);
    assert_eq!(ToolInfo::current().name, "ptreval");
}

#[test]
fn given_a_tool_output_line_when_parsed_then_keyed_timings_are_available() {
    // Given one line as written by the analysis tool
    let line = r#"{
        "file": "/corpus/a.R",
        "run": 2,
        "slices": 3,
        "failedToReconstruct": 1,
        "timesHitThreshold": 0,
        "common": [["retrieve ast", 12.5], ["total", 40]],
        "perSlice": [["static slicing", 2.0], ["reconstruct code", 1.0], ["total", 3.5]],
        "input": {
            "numberOfLines": 10, "numberOfNonEmptyLines": 8,
            "numberOfCharacters": 200, "numberOfCharactersNoComments": 150,
            "numberOfNonWhitespaceCharacters": 120, "numberOfNonWhitespaceCharactersNoComments": 90,
            "numberOfTokens": 50, "numberOfTokensNoComments": 40,
            "numberOfNormalizedTokens": 45, "numberOfNormalizedTokensNoComments": 35
        },
        "dataflow": {
            "numberOfNodes": 30, "numberOfEdges": 40, "numberOfCalls": 5,
            "numberOfFunctionDefinitions": 2, "sizeOfObject": 1024,
            "storedVertexIndices": 0, "storedEnvIndices": 0, "overwrittenIndices": 0
        },
        "reduction": {
            "numberOfLines": 0.5, "numberOfLinesNoAutoSelection": 0.6,
            "numberOfCharacters": 0.4, "numberOfNonWhitespaceCharacters": 0.4,
            "numberOfTokens": 0.3, "numberOfNormalizedTokens": 0.3, "numberOfDataflowNodes": 0.2
        },
        "reductionNoFluff": {
            "numberOfLines": 0.5, "numberOfLinesNoAutoSelection": 0.6,
            "numberOfCharacters": 0.4, "numberOfNonWhitespaceCharacters": 0.4,
            "numberOfTokens": 0.3, "numberOfNormalizedTokens": 0.3, "numberOfDataflowNodes": "NaN"
        }
    }"#;

    // When it is parsed
    let record: MeasurementRecord = serde_json::from_str(line).unwrap();

    // Then every keyed timing is addressable by its closed key
    assert_eq!(record.run, 2);
    assert_eq!(
        record.common.get(&CommonMeasurement::RetrieveAst),
        Some(&Sample(12.5))
    );
    assert_eq!(
        record.per_slice.get(&PerSliceMeasurement::Total),
        Some(&Sample(3.5))
    );
    assert_eq!(record.dataflow.size_of_object, Sample(1024.0));
    // And a non-finite ratio survives parsing
    assert!(record.reduction_no_fluff.number_of_dataflow_nodes.value().is_nan());
}

#[test]
fn given_an_unknown_measurement_key_when_parsed_then_it_is_rejected() {
    let line = r#"[["warm up", 1.0]]"#;
    let parsed: Result<ptreval_types::MeasurementMap<PerSliceMeasurement, Sample>, _> =
        serde_json::from_str(line);
    assert!(parsed.is_err());
}

#[test]
fn given_default_aggregate_when_serialized_then_counts_are_plain_numbers() {
    // Given an aggregate with counts set
    let report = AggregateReport {
        total_requests: Count(4),
        total_slices: Count(9),
        ..Default::default()
    };

    // When serialized
    let value = serde_json::to_value(&report).unwrap();

    // Then counts are bare integers and maps are empty pair arrays
    assert_eq!(value["totalRequests"], 4);
    assert_eq!(value["totalSlices"], 9);
    assert_eq!(value["commonMeasurements"], serde_json::json!([]));
    assert_eq!(value["timePerToken"]["totalCommon"]["raw"]["mean"], 0.0);
    assert!(value["reductionNoFluff"]["numberOfDataflowNodes"].is_object());
}

#[test]
fn given_empty_discovery_when_serialized_then_keys_are_camel_case() {
    let value = serde_json::to_value(DiscoveryReport::default()).unwrap();
    for key in [
        "eligible",
        "excludedBinary",
        "excludedEmpty",
        "excludedNonCode",
        "filesThatInclude",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn given_two_values_when_delta_built_then_relative_and_factor_follow() {
    // Given A = 4 and B = 6
    let d = EvalDelta::new(4.0, 6.0);

    // Then the diff is absolute, relative to A, and the factor is B / A
    assert_eq!(d.diff, 2.0);
    assert_eq!(d.diff_relative, 0.5);
    assert_eq!(d.factor, 1.5);
}

#[test]
fn raw_pair_uses_value_a_and_value_b_keys() {
    let pair = RawPair {
        value_a: 3,
        value_b: 7,
    };
    let value = serde_json::to_value(pair).unwrap();
    assert_eq!(value, serde_json::json!({"valueA": 3, "valueB": 7}));
}
