//! Deterministic numeric and statistical helpers.
//!
//! Every statistic here reads an ascending-sorted slice. Sorting with
//! [`sort_samples`] first makes the floating point result independent of the
//! order in which samples were collected.

#![forbid(unsafe_code)]

/// Round a floating point value to `decimals` decimal places.
#[must_use]
pub fn round_f64(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Sort samples ascending under IEEE total order (NaN sorts to the ends).
pub fn sort_samples(samples: &mut [f64]) {
    samples.sort_by(f64::total_cmp);
}

/// Sum of an ascending-sorted slice, accumulated left to right.
#[must_use]
pub fn sum(sorted: &[f64]) -> f64 {
    sorted.iter().fold(0.0, |acc, v| acc + v)
}

/// Arithmetic mean; zero for an empty slice.
#[must_use]
pub fn mean(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sum(sorted) / sorted.len() as f64
}

/// Median of an ascending-sorted slice; the mean of the two central values
/// for even lengths, zero when empty.
#[must_use]
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Population standard deviation around `mean`; zero when empty.
#[must_use]
pub fn population_std(sorted: &[f64], mean: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let squares = sorted.iter().fold(0.0, |acc, v| {
        let d = v - mean;
        acc + d * d
    });
    (squares / sorted.len() as f64).sqrt()
}

/// Difference between the largest and smallest value; zero when empty.
#[must_use]
pub fn spread(values: &[u64]) -> u64 {
    match (values.iter().max(), values.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_f64_rounds_expected_precision() {
        let value = 12.34567;
        assert_eq!(round_f64(value, 2), 12.35);
        assert_eq!(round_f64(value, 4), 12.3457);
    }

    #[test]
    fn empty_slices_reduce_to_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(population_std(&[], 0.0), 0.0);
        assert_eq!(spread(&[]), 0);
    }

    #[test]
    fn median_averages_central_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[1.0, 5.0, 9.0]), 5.0);
    }

    #[test]
    fn slice_times_reduce_to_expected_statistics() {
        let mut samples = vec![120.0, 80.0, 200.0];
        sort_samples(&mut samples);
        assert_eq!(samples, vec![80.0, 120.0, 200.0]);
        assert_eq!(sum(&samples), 400.0);
        assert_eq!(round_f64(mean(&samples), 2), 133.33);
        assert_eq!(median(&samples), 120.0);
        let std = population_std(&samples, mean(&samples));
        assert_eq!(round_f64(std, 2), 49.89);
    }

    #[test]
    fn nan_sorts_to_the_end() {
        let mut samples = vec![f64::NAN, 1.0, -2.0];
        sort_samples(&mut samples);
        assert_eq!(samples[0], -2.0);
        assert_eq!(samples[1], 1.0);
        assert!(samples[2].is_nan());
    }

    #[test]
    fn spread_of_bucket_costs() {
        assert_eq!(spread(&[110, 130]), 20);
        assert_eq!(spread(&[7]), 0);
    }
}
