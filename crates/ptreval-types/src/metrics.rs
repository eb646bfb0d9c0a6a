//! Metric taxonomy.
//!
//! Every metric family is a closed, fixed-field record generic over its leaf
//! type, so one family definition serves raw samples (`Family<Sample>`),
//! reduction state, summaries (`Family<SummarizedMeasurement>`) and
//! comparison output alike. Per-stage timings are maps keyed by closed enums
//! and serialize as ordered `[key, value]` pair arrays.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Declare a metric family: a generic fixed-field record plus the
/// structural helpers (`from_fn`, `map`, `zip_with`, `update_with`, `iter`)
/// that let reducers and comparators walk every field without naming it.
macro_rules! metric_family {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* $field:ident => $key:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name<T> {
            $(
                $(#[$fmeta])*
                #[serde(rename = $key)]
                pub $field: T,
            )+
        }

        impl<T> $name<T> {
            /// Serialized key of every field, in declaration order.
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            pub fn from_fn(mut f: impl FnMut(&'static str) -> T) -> Self {
                Self { $( $field: f($key), )+ }
            }

            pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> $name<U> {
                $name { $( $field: f(&self.$field), )+ }
            }

            pub fn zip_with<U, V>(
                &self,
                other: &$name<U>,
                mut f: impl FnMut(&T, &U) -> V,
            ) -> $name<V> {
                $name { $( $field: f(&self.$field, &other.$field), )+ }
            }

            pub fn update_with<U>(&mut self, other: &$name<U>, mut f: impl FnMut(&mut T, &U)) {
                $( f(&mut self.$field, &other.$field); )+
            }

            pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
                [$( ($key, &self.$field) ),+].into_iter()
            }
        }
    };
}

metric_family! {
    /// Size of the dataflow graph the analysis produced for one file.
    pub struct DataflowMetrics {
        number_of_nodes => "numberOfNodes",
        number_of_edges => "numberOfEdges",
        number_of_calls => "numberOfCalls",
        number_of_function_definitions => "numberOfFunctionDefinitions",
        /// Serialized size of the graph object in bytes.
        size_of_object => "sizeOfObject",
        stored_vertex_indices => "storedVertexIndices",
        stored_env_indices => "storedEnvIndices",
        overwritten_indices => "overwrittenIndices",
    }
}

metric_family! {
    /// Size of the analysed input.
    pub struct InputMetrics {
        number_of_lines => "numberOfLines",
        number_of_non_empty_lines => "numberOfNonEmptyLines",
        number_of_characters => "numberOfCharacters",
        number_of_characters_no_comments => "numberOfCharactersNoComments",
        number_of_non_whitespace_characters => "numberOfNonWhitespaceCharacters",
        number_of_non_whitespace_characters_no_comments => "numberOfNonWhitespaceCharactersNoComments",
        number_of_tokens => "numberOfTokens",
        number_of_tokens_no_comments => "numberOfTokensNoComments",
        number_of_normalized_tokens => "numberOfNormalizedTokens",
        number_of_normalized_tokens_no_comments => "numberOfNormalizedTokensNoComments",
    }
}

metric_family! {
    /// How much of the original file a slice kept, as ratios in `[0, 1]`.
    pub struct ReductionMetrics {
        number_of_lines => "numberOfLines",
        number_of_lines_no_auto_selection => "numberOfLinesNoAutoSelection",
        number_of_characters => "numberOfCharacters",
        number_of_non_whitespace_characters => "numberOfNonWhitespaceCharacters",
        number_of_tokens => "numberOfTokens",
        number_of_normalized_tokens => "numberOfNormalizedTokens",
        number_of_dataflow_nodes => "numberOfDataflowNodes",
    }
}

metric_family! {
    /// A stage timing in milliseconds and the same timing per input token.
    pub struct TimePerToken {
        raw => "raw",
        normalized => "normalized",
    }
}

metric_family! {
    /// Timings of every analysis stage, each as a [`TimePerToken`] pair.
    pub struct TimePerTokenMetrics {
        retrieve => "retrieve",
        normalize => "normalize",
        dataflow => "dataflow",
        total_common => "totalCommon",
        slice => "slice",
        reconstruct => "reconstruct",
        total_per_slice => "totalPerSlice",
    }
}

/// Per-file stage timings reported by the analysis tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CommonMeasurement {
    #[serde(rename = "load request")]
    LoadRequest,
    #[serde(rename = "retrieve ast")]
    RetrieveAst,
    #[serde(rename = "normalize ast")]
    NormalizeAst,
    #[serde(rename = "produce dataflow")]
    ProduceDataflow,
    #[serde(rename = "total")]
    Total,
}

impl CommonMeasurement {
    pub const ALL: [Self; 5] = [
        Self::LoadRequest,
        Self::RetrieveAst,
        Self::NormalizeAst,
        Self::ProduceDataflow,
        Self::Total,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadRequest => "load request",
            Self::RetrieveAst => "retrieve ast",
            Self::NormalizeAst => "normalize ast",
            Self::ProduceDataflow => "produce dataflow",
            Self::Total => "total",
        }
    }
}

/// Per-slice stage timings, already averaged over the slices of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerSliceMeasurement {
    #[serde(rename = "static slicing")]
    StaticSlicing,
    #[serde(rename = "reconstruct code")]
    ReconstructCode,
    #[serde(rename = "total")]
    Total,
}

impl PerSliceMeasurement {
    pub const ALL: [Self; 3] = [Self::StaticSlicing, Self::ReconstructCode, Self::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticSlicing => "static slicing",
            Self::ReconstructCode => "reconstruct code",
            Self::Total => "total",
        }
    }
}

impl fmt::Display for CommonMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PerSliceMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered map keyed by a closed measurement enum.
///
/// Serialized as an array of `[key, value]` pairs so key identity survives a
/// round trip regardless of how the key type renders.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementMap<K: Ord, V>(BTreeMap<K, V>);

impl<K: Ord, V> Default for MeasurementMap<K, V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Ord, V> MeasurementMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.0.get_mut(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn entry(&mut self, key: K) -> btree_map::Entry<'_, K, V> {
        self.0.entry(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for MeasurementMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: Ord, V> IntoIterator for MeasurementMap<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a MeasurementMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Ord + Serialize, V: Serialize> Serialize for MeasurementMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de, K, V> Deserialize<'de> for MeasurementMap<K, V>
where
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// One raw scalar sample from a measurement record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample(pub f64);

impl Sample {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::float::deserialize(deserializer).map(Sample)
    }
}

/// Six-statistic reduction of one metric over many samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarizedMeasurement {
    #[serde(with = "crate::float")]
    pub min: f64,
    #[serde(with = "crate::float")]
    pub max: f64,
    #[serde(with = "crate::float")]
    pub mean: f64,
    #[serde(with = "crate::float")]
    pub median: f64,
    #[serde(with = "crate::float")]
    pub std: f64,
    #[serde(with = "crate::float")]
    pub total: f64,
}

impl SummarizedMeasurement {
    pub const STATISTICS: [&'static str; 6] = ["min", "max", "mean", "median", "std", "total"];

    pub fn statistics(&self) -> [(&'static str, f64); 6] {
        [
            ("min", self.min),
            ("max", self.max),
            ("mean", self.mean),
            ("median", self.median),
            ("std", self.std),
            ("total", self.total),
        ]
    }
}

/// A pure count of inputs. Compared as a raw pair, never as a ratio.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Count(pub u64);

/// One line of the analysis tool's output: the measurements of one file in
/// one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub file: String,
    #[serde(default)]
    pub run: u32,
    /// Number of slices computed for this file.
    #[serde(default)]
    pub slices: u64,
    #[serde(default)]
    pub failed_to_reconstruct: u64,
    #[serde(default)]
    pub times_hit_threshold: u64,
    #[serde(default)]
    pub common: MeasurementMap<CommonMeasurement, Sample>,
    #[serde(default)]
    pub per_slice: MeasurementMap<PerSliceMeasurement, Sample>,
    pub input: InputMetrics<Sample>,
    pub dataflow: DataflowMetrics<Sample>,
    pub reduction: ReductionMetrics<Sample>,
    pub reduction_no_fluff: ReductionMetrics<Sample>,
}

impl MeasurementRecord {
    /// Stage timings in milliseconds, keyed by time-per-token stage.
    pub fn stage_times(&self) -> TimePerTokenMetrics<Option<f64>> {
        let common = |key| self.common.get(&key).map(|s| s.value());
        let per_slice = |key| self.per_slice.get(&key).map(|s| s.value());
        TimePerTokenMetrics {
            retrieve: common(CommonMeasurement::RetrieveAst),
            normalize: common(CommonMeasurement::NormalizeAst),
            dataflow: common(CommonMeasurement::ProduceDataflow),
            total_common: common(CommonMeasurement::Total),
            slice: per_slice(PerSliceMeasurement::StaticSlicing),
            reconstruct: per_slice(PerSliceMeasurement::ReconstructCode),
            total_per_slice: per_slice(PerSliceMeasurement::Total),
        }
    }
}

/// The statistical summary of one configuration (or one file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub total_requests: Count,
    pub total_slices: Count,
    pub failed_to_reconstruct: u64,
    pub times_hit_threshold: u64,
    pub common_measurements: MeasurementMap<CommonMeasurement, SummarizedMeasurement>,
    pub per_slice_measurements: MeasurementMap<PerSliceMeasurement, SummarizedMeasurement>,
    pub time_per_token: TimePerTokenMetrics<TimePerToken<SummarizedMeasurement>>,
    pub reduction: ReductionMetrics<SummarizedMeasurement>,
    pub reduction_no_fluff: ReductionMetrics<SummarizedMeasurement>,
    pub input: InputMetrics<SummarizedMeasurement>,
    pub dataflow: DataflowMetrics<SummarizedMeasurement>,
}

/// One line of a per-file summary log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub file: String,
    pub runs: u64,
    pub summary: AggregateReport,
}
