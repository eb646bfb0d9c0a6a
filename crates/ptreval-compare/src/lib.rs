//! # ptreval-compare
//!
//! **Tier 2 (Comparison)**
//!
//! Turns two [`AggregateReport`]s into an [`EvalReport`] of the same shape.
//!
//! Comparison is a structural recursion: every node kind implements
//! [`Compare`] once and composite nodes delegate field by field. Pure
//! counts become a [`RawPair`], tallies and floats an [`EvalDelta`] and
//! each [`SummarizedMeasurement`] an [`EvalSummarizedMeasurement`].
//!
//! ## What belongs here
//! * The `Compare` trait and its implementations
//! * Pairwise and per-file comparison
//! * Sanity checks over comparison results
//!
//! ## What does NOT belong here
//! * Producing summaries (use ptreval-summarize)
//! * Output files (use the CLI)

mod per_file;
pub mod sanity;

use std::collections::BTreeSet;

use ptreval_types::{
    AggregateReport, Count, DataflowMetrics, EvalDelta, EvalSummarizedMeasurement, InputMetrics,
    MeasurementMap, RawPair, ReductionMetrics, SummarizedMeasurement, TimePerToken,
    TimePerTokenMetrics,
};
use serde::{Deserialize, Serialize};

pub use per_file::{FileComparison, PerFileComparison, compare_per_file};
pub use sanity::{SanityKind, SanityWarning, check};

/// A node that can be compared against another node of the same kind.
pub trait Compare {
    type Output;

    /// Compare `self` (side A) against `other` (side B).
    fn compare(&self, other: &Self) -> Self::Output;
}

impl Compare for Count {
    type Output = RawPair;

    fn compare(&self, other: &Self) -> RawPair {
        RawPair {
            value_a: self.0,
            value_b: other.0,
        }
    }
}

impl Compare for u64 {
    type Output = EvalDelta;

    fn compare(&self, other: &Self) -> EvalDelta {
        EvalDelta::new(*self as f64, *other as f64)
    }
}

impl Compare for f64 {
    type Output = EvalDelta;

    fn compare(&self, other: &Self) -> EvalDelta {
        EvalDelta::new(*self, *other)
    }
}

impl Compare for SummarizedMeasurement {
    type Output = EvalSummarizedMeasurement;

    fn compare(&self, other: &Self) -> EvalSummarizedMeasurement {
        EvalSummarizedMeasurement {
            min: self.min.compare(&other.min),
            max: self.max.compare(&other.max),
            mean: self.mean.compare(&other.mean),
            median: self.median.compare(&other.median),
            std: self.std.compare(&other.std),
            total: self.total.compare(&other.total),
        }
    }
}

/// Key-wise over the union of keys; a key missing on one side compares as
/// that side's default (the all-zero summary).
impl<K, V> Compare for MeasurementMap<K, V>
where
    K: Ord + Copy,
    V: Compare + Default,
{
    type Output = MeasurementMap<K, V::Output>;

    fn compare(&self, other: &Self) -> Self::Output {
        let keys: BTreeSet<K> = self.keys().chain(other.keys()).copied().collect();
        let empty = V::default();
        keys.into_iter()
            .map(|key| {
                let a = self.get(&key).unwrap_or(&empty);
                let b = other.get(&key).unwrap_or(&empty);
                (key, a.compare(b))
            })
            .collect()
    }
}

macro_rules! compare_family {
    ($($family:ident),+ $(,)?) => {
        $(
            impl<T: Compare> Compare for $family<T> {
                type Output = $family<T::Output>;

                fn compare(&self, other: &Self) -> Self::Output {
                    self.zip_with(other, |a, b| a.compare(b))
                }
            }
        )+
    };
}

compare_family!(
    DataflowMetrics,
    InputMetrics,
    ReductionMetrics,
    TimePerToken,
    TimePerTokenMetrics,
);

/// Declare the comparison of a record: a struct with one field per source
/// field, typed as that field's comparison output.
macro_rules! compare_record {
    (
        $(#[$meta:meta])*
        pub struct $eval:ident from $source:ty {
            $( $field:ident : $ty:ty ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $eval {
            $( pub $field: <$ty as Compare>::Output, )+
        }

        impl Compare for $source {
            type Output = $eval;

            fn compare(&self, other: &Self) -> $eval {
                $eval {
                    $( $field: self.$field.compare(&other.$field), )+
                }
            }
        }
    };
}

compare_record! {
    /// Comparison of two [`AggregateReport`]s.
    pub struct EvalReport from AggregateReport {
        total_requests: Count,
        total_slices: Count,
        failed_to_reconstruct: u64,
        times_hit_threshold: u64,
        common_measurements: MeasurementMap<ptreval_types::CommonMeasurement, SummarizedMeasurement>,
        per_slice_measurements: MeasurementMap<ptreval_types::PerSliceMeasurement, SummarizedMeasurement>,
        time_per_token: TimePerTokenMetrics<TimePerToken<SummarizedMeasurement>>,
        reduction: ReductionMetrics<SummarizedMeasurement>,
        reduction_no_fluff: ReductionMetrics<SummarizedMeasurement>,
        input: InputMetrics<SummarizedMeasurement>,
        dataflow: DataflowMetrics<SummarizedMeasurement>,
    }
}

/// An [`EvalReport`] labelled with the configurations it compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedComparison {
    pub config_a: String,
    pub config_b: String,
    pub eval: EvalReport,
}

impl NamedComparison {
    /// Directory name under `compare/`.
    pub fn slug(&self) -> String {
        format!("{}--{}", self.config_a, self.config_b)
    }
}

/// Compare every unordered pair `(i, j)` with `i < j`, in input order.
pub fn pairwise<T: Compare>(items: &[(String, T)]) -> Vec<(String, String, T::Output)> {
    let mut out = Vec::new();
    for (i, (name_a, a)) in items.iter().enumerate() {
        for (name_b, b) in &items[i + 1..] {
            out.push((name_a.clone(), name_b.clone(), a.compare(b)));
        }
    }
    out
}

/// [`pairwise`] over aggregate reports, labelled.
pub fn compare_configs(reports: &[(String, AggregateReport)]) -> Vec<NamedComparison> {
    pairwise(reports)
        .into_iter()
        .map(|(config_a, config_b, eval)| {
            tracing::info!(a = %config_a, b = %config_b, "compared configurations");
            NamedComparison {
                config_a,
                config_b,
                eval,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptreval_types::PerSliceMeasurement;

    fn summary(v: f64) -> SummarizedMeasurement {
        SummarizedMeasurement {
            min: v,
            max: v,
            mean: v,
            median: v,
            std: 0.0,
            total: v,
        }
    }

    #[test]
    fn count_compares_to_raw_pair() {
        assert_eq!(
            Count(3).compare(&Count(5)),
            RawPair {
                value_a: 3,
                value_b: 5
            }
        );
    }

    #[test]
    fn zero_base_yields_infinite_ratios() {
        let d = 0.0f64.compare(&5.0);
        assert_eq!(d.diff, 5.0);
        assert_eq!(d.factor, f64::INFINITY);
        assert_eq!(d.diff_relative, f64::INFINITY);
    }

    #[test]
    fn map_missing_side_compares_as_zero_summary() {
        let a: MeasurementMap<PerSliceMeasurement, SummarizedMeasurement> =
            [(PerSliceMeasurement::Total, summary(4.0))].into_iter().collect();
        let b: MeasurementMap<PerSliceMeasurement, SummarizedMeasurement> =
            [(PerSliceMeasurement::StaticSlicing, summary(2.0))].into_iter().collect();
        let out = a.compare(&b);
        assert_eq!(out.len(), 2);
        let total = out.get(&PerSliceMeasurement::Total).unwrap();
        assert_eq!(total.mean.value_b, 0.0);
        assert_eq!(total.mean.diff, -4.0);
        let slicing = out.get(&PerSliceMeasurement::StaticSlicing).unwrap();
        assert_eq!(slicing.mean.factor, f64::INFINITY);
    }

    #[test]
    fn families_compare_field_by_field() {
        let a = TimePerToken {
            raw: summary(2.0),
            normalized: summary(1.0),
        };
        let b = TimePerToken {
            raw: summary(6.0),
            normalized: summary(1.0),
        };
        let out = a.compare(&b);
        assert_eq!(out.raw.mean.factor, 3.0);
        assert_eq!(out.normalized.mean.diff, 0.0);
    }

    #[test]
    fn pairwise_visits_each_unordered_pair_once() {
        let items: Vec<(String, u64)> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), i as u64 + 1))
            .collect();
        let pairs: Vec<(String, String)> = pairwise(&items)
            .into_iter()
            .map(|(a, b, _)| (a, b))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "b".to_string()),
                ("a".to_string(), "c".to_string()),
                ("b".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn eval_report_serializes_counts_as_pairs() {
        let a = AggregateReport {
            total_requests: Count(10),
            failed_to_reconstruct: 2,
            ..Default::default()
        };
        let b = AggregateReport {
            total_requests: Count(12),
            failed_to_reconstruct: 3,
            ..Default::default()
        };
        let value = serde_json::to_value(a.compare(&b)).unwrap();
        assert_eq!(value["totalRequests"], serde_json::json!({"valueA": 10, "valueB": 12}));
        assert_eq!(value["failedToReconstruct"]["diff"], 1.0);
        assert_eq!(value["failedToReconstruct"]["factor"], 1.5);
    }
}
