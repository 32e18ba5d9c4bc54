//! Numeric reduction over profiler and load-generator sample sequences.
//!
//! Percentiles use the nearest-rank method (sort ascending, pick the element
//! at `ceil(p/100 * n) - 1`), not linear interpolation, so results differ
//! from statistics libraries that interpolate. `p = 0` selects the minimum,
//! `p = 100` the maximum.
//!
//! Empty input returns [`SENTINEL`] instead of failing: a single missing
//! metric should not abort an otherwise valid run, but renderers must show
//! the sentinel distinctly from a real measurement.

/// Value returned for reductions over an empty sample sequence.
pub const SENTINEL: i64 = -1;

/// Percentile points collected for every distribution metric.
pub const STANDARD_PERCENTILES: [f64; 5] = [0.0, 50.0, 90.0, 99.0, 100.0];

/// Truncating integer mean.
///
/// Integer division is deliberate: it keeps byte counts and memory sizes in
/// the same domain as their samples and matches the historical CSV series.
/// Use [`average_double`] when exact means are needed.
pub fn average_long(samples: &[i64]) -> i64 {
    if samples.is_empty() {
        return SENTINEL;
    }
    let total: i64 = samples.iter().sum();
    total / samples.len() as i64
}

/// Arithmetic mean over floating-point samples.
pub fn average_double(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return SENTINEL as f64;
    }
    let total: f64 = samples.iter().sum();
    total / samples.len() as f64
}

/// Nearest-rank percentile for `p` in `[0, 100]` over integer samples.
pub fn percentile_long(samples: &[i64], p: f64) -> i64 {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    percentile_of_sorted_long(&sorted, p)
}

/// Nearest-rank percentile for `p` in `[0, 100]` over floating-point samples.
pub fn percentile_double(samples: &[f64], p: f64) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    percentile_of_sorted_double(&sorted, p)
}

/// Evaluates several percentile points against a single sorted copy.
///
/// Sorting once matters when many points are requested per metric and dozens
/// of metrics are reduced per run.
pub fn percentiles_long(samples: &[i64], points: &[f64]) -> Vec<i64> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    points
        .iter()
        .map(|&p| percentile_of_sorted_long(&sorted, p))
        .collect()
}

/// Floating-point variant of [`percentiles_long`].
pub fn percentiles_double(samples: &[f64], points: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    points
        .iter()
        .map(|&p| percentile_of_sorted_double(&sorted, p))
        .collect()
}

fn nearest_rank_index(len: usize, p: f64) -> usize {
    let index = (p / 100.0 * len as f64).ceil() as isize - 1;
    index.max(0) as usize
}

fn percentile_of_sorted_long(sorted: &[i64], p: f64) -> i64 {
    if sorted.is_empty() {
        return SENTINEL;
    }
    sorted[nearest_rank_index(sorted.len(), p)]
}

fn percentile_of_sorted_double(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return SENTINEL as f64;
    }
    sorted[nearest_rank_index(sorted.len(), p)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_long_truncates() {
        assert_eq!(average_long(&[10, 20, 30, 40, 50]), 30);
        // 10 / 3 truncates toward zero
        assert_eq!(average_long(&[3, 3, 4]), 3);
    }

    #[test]
    fn test_average_double_exact() {
        let avg = average_double(&[3.0, 3.0, 4.0]);
        assert!((avg - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_samples_return_sentinel() {
        assert_eq!(average_long(&[]), SENTINEL);
        assert_eq!(average_double(&[]), SENTINEL as f64);
        assert_eq!(percentile_long(&[], 50.0), SENTINEL);
        assert_eq!(percentile_double(&[], 50.0), SENTINEL as f64);
        assert_eq!(percentiles_long(&[], &STANDARD_PERCENTILES), vec![SENTINEL; 5]);
    }

    #[test]
    fn test_percentile_bounds_are_min_and_max() {
        let samples = [42, 7, 99, 13];
        assert_eq!(percentile_long(&samples, 0.0), 7);
        assert_eq!(percentile_long(&samples, 100.0), 99);

        let doubles = [1.5, 0.25, 3.75];
        assert_eq!(percentile_double(&doubles, 0.0), 0.25);
        assert_eq!(percentile_double(&doubles, 100.0), 3.75);
    }

    #[test]
    fn test_percentile_scenario() {
        let samples = [10, 20, 30, 40, 50];
        assert_eq!(percentile_long(&samples, 50.0), 30);
        assert_eq!(percentile_long(&samples, 90.0), 50);
        assert_eq!(percentile_long(&samples, 0.0), 10);
    }

    #[test]
    fn test_percentile_monotonic() {
        let samples = [5, 1, 9, 3, 7, 2, 8];
        let mut last = i64::MIN;
        for p in 0..=100 {
            let value = percentile_long(&samples, p as f64);
            assert!(value >= last, "percentile not monotonic at p={p}");
            last = value;
        }
    }

    #[test]
    fn test_batch_percentiles_match_individual() {
        let samples = [4.0, 8.0, 15.0, 16.0, 23.0, 42.0];
        let points = [99.0, 0.0, 90.0, 100.0, 50.0];
        let batch = percentiles_double(&samples, &points);
        for (i, &p) in points.iter().enumerate() {
            assert_eq!(batch[i], percentile_double(&samples, p));
        }
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(percentile_long(&[17], 0.0), 17);
        assert_eq!(percentile_long(&[17], 50.0), 17);
        assert_eq!(percentile_long(&[17], 100.0), 17);
        assert_eq!(average_long(&[17]), 17);
    }
}
