//! BDD-style scenario tests for ptreval-compare.

use ptreval_compare::{Compare, compare_configs};
use ptreval_types::{
    AggregateReport, CommonMeasurement, Count, SummarizedMeasurement,
};

fn report(requests: u64, total_ms: f64) -> AggregateReport {
    let mut report = AggregateReport {
        total_requests: Count(requests),
        ..Default::default()
    };
    report.common_measurements.insert(
        CommonMeasurement::Total,
        SummarizedMeasurement {
            min: total_ms,
            max: total_ms,
            mean: total_ms,
            median: total_ms,
            std: 0.0,
            total: total_ms * requests as f64,
        },
    );
    report
}

#[test]
fn given_two_configurations_when_compared_then_one_named_comparison_is_produced() {
    // Given an insensitive and a sensitive summary
    let reports = vec![
        ("insens".to_string(), report(10, 20.0)),
        ("sens".to_string(), report(10, 30.0)),
    ];

    // When compared pairwise
    let comparisons = compare_configs(&reports);

    // Then one comparison A=insens, B=sens exists with the expected factor
    assert_eq!(comparisons.len(), 1);
    assert_eq!(comparisons[0].slug(), "insens--sens");
    let total = comparisons[0]
        .eval
        .common_measurements
        .get(&CommonMeasurement::Total)
        .unwrap();
    assert_eq!(total.mean.diff, 10.0);
    assert_eq!(total.mean.diff_relative, 0.5);
    assert_eq!(total.mean.factor, 1.5);
    assert_eq!(comparisons[0].eval.total_requests.value_a, 10);
}

#[test]
fn given_three_configurations_when_compared_then_three_pairs_in_profile_order() {
    let reports = vec![
        ("a".to_string(), report(1, 1.0)),
        ("b".to_string(), report(1, 2.0)),
        ("c".to_string(), report(1, 4.0)),
    ];

    let slugs: Vec<String> = compare_configs(&reports).iter().map(|c| c.slug()).collect();

    assert_eq!(slugs, vec!["a--b", "a--c", "b--c"]);
}

#[test]
fn given_a_single_configuration_when_compared_then_nothing_is_produced() {
    assert!(compare_configs(&[("only".to_string(), report(1, 1.0))]).is_empty());
}

#[test]
fn given_a_zero_baseline_when_compared_then_json_keeps_infinity() {
    // Given a baseline of zero and a positive value
    let a = report(0, 0.0);
    let b = report(1, 5.0);

    // When compared and serialized
    let eval = a.compare(&b);
    let value = serde_json::to_value(&eval).unwrap();

    // Then the non-finite ratios survive as strings
    let total = &value["commonMeasurements"][0][1]["mean"];
    assert_eq!(value["commonMeasurements"][0][0], "total");
    assert_eq!(total["diff"], 5.0);
    assert_eq!(total["factor"], "Infinity");
    assert_eq!(total["diffRelative"], "Infinity");
}
