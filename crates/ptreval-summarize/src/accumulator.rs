//! Sample accumulation and reduction.

use ptreval_math::{mean, median, population_std, sort_samples, sum};
use ptreval_types::{
    AggregateReport, CommonMeasurement, Count, DataflowMetrics, InputMetrics, MeasurementMap,
    MeasurementRecord, PerSliceMeasurement, ReductionMetrics, SummarizedMeasurement, TimePerToken,
    TimePerTokenMetrics,
};

/// Samples of one leaf metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    samples: Vec<f64>,
}

impl Accumulator {
    pub fn push(&mut self, value: f64) {
        self.samples.push(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Reduce to the six statistics. An empty accumulator reduces to zeros.
    pub fn finish(&self) -> SummarizedMeasurement {
        if self.samples.is_empty() {
            return SummarizedMeasurement::default();
        }
        let mut sorted = self.samples.clone();
        sort_samples(&mut sorted);
        let mean = mean(&sorted);
        SummarizedMeasurement {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median: median(&sorted),
            std: population_std(&sorted, mean),
            total: sum(&sorted),
        }
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Running state mirroring [`AggregateReport`].
#[derive(Debug, Clone, Default)]
pub struct ReportAccumulator {
    requests: u64,
    slices: u64,
    failed_to_reconstruct: u64,
    times_hit_threshold: u64,
    common: MeasurementMap<CommonMeasurement, Accumulator>,
    per_slice: MeasurementMap<PerSliceMeasurement, Accumulator>,
    time_per_token: TimePerTokenMetrics<TimePerToken<Accumulator>>,
    reduction: ReductionMetrics<Accumulator>,
    reduction_no_fluff: ReductionMetrics<Accumulator>,
    input: InputMetrics<Accumulator>,
    dataflow: DataflowMetrics<Accumulator>,
}

impl ReportAccumulator {
    pub fn records(&self) -> u64 {
        self.requests
    }

    pub fn add(&mut self, record: &MeasurementRecord) {
        self.requests += 1;
        self.slices += record.slices;
        self.failed_to_reconstruct += record.failed_to_reconstruct;
        self.times_hit_threshold += record.times_hit_threshold;

        for (key, sample) in &record.common {
            self.common.entry(*key).or_default().push(sample.value());
        }
        for (key, sample) in &record.per_slice {
            self.per_slice.entry(*key).or_default().push(sample.value());
        }

        let tokens = record.input.number_of_tokens.value();
        self.time_per_token
            .update_with(&record.stage_times(), |acc, ms| {
                if let Some(ms) = *ms {
                    acc.raw.push(ms);
                    acc.normalized.push(ms / tokens);
                }
            });

        let push = |acc: &mut Accumulator, sample: &ptreval_types::Sample| acc.push(sample.value());
        self.reduction.update_with(&record.reduction, push);
        self.reduction_no_fluff
            .update_with(&record.reduction_no_fluff, push);
        self.input.update_with(&record.input, push);
        self.dataflow.update_with(&record.dataflow, push);
    }

    /// Reduce to a report. Keyed maps carry every key of their enum, with
    /// zeros for keys no record reported.
    pub fn finish(&self) -> AggregateReport {
        let summarize = |acc: &Accumulator| acc.finish();
        AggregateReport {
            total_requests: Count(self.requests),
            total_slices: Count(self.slices),
            failed_to_reconstruct: self.failed_to_reconstruct,
            times_hit_threshold: self.times_hit_threshold,
            common_measurements: CommonMeasurement::ALL
                .iter()
                .map(|key| (*key, self.common.get(key).map(summarize).unwrap_or_default()))
                .collect(),
            per_slice_measurements: PerSliceMeasurement::ALL
                .iter()
                .map(|key| {
                    (*key, self.per_slice.get(key).map(summarize).unwrap_or_default())
                })
                .collect(),
            time_per_token: self.time_per_token.map(|stage| stage.map(summarize)),
            reduction: self.reduction.map(summarize),
            reduction_no_fluff: self.reduction_no_fluff.map(summarize),
            input: self.input.map(summarize),
            dataflow: self.dataflow.map(summarize),
        }
    }
}
