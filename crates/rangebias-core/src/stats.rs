//! Descriptive statistics: pooled per-range statistics against the uniform
//! null, and plain per-run sample summaries.
//!
//! All outputs are raw `f64`; rounding is left to whatever renders them.

use serde::Serialize;

use crate::map::OrderedMap;
use crate::range::Range;
use crate::samples::RunCollection;

// ---------------------------------------------------------------------------
// Moments
// ---------------------------------------------------------------------------

/// Arithmetic mean. Callers guarantee a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n). Callers guarantee a
/// non-empty slice.
pub(crate) fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })
}

/// Percentile `q` in `[0, 100]` of an ascending slice, interpolating
/// linearly between the two closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let h = (n - 1) as f64 * (q / 100.0).clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

// ---------------------------------------------------------------------------
// Pooled range statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics of one range's pooled samples, compared with the
/// moments of Uniform(lower, upper).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeStatistics {
    pub total_samples: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// `(lower + upper) / 2`
    pub expected_mean: f64,
    /// `(upper - lower) / sqrt(12)`
    pub expected_std: f64,
    /// Observed mean minus expected mean.
    pub mean_bias: f64,
    /// Observed std over expected std. Far from 1.0 means under- or
    /// over-dispersion; diagnostic only.
    pub std_ratio: f64,
    /// Fraction of the range width spanned by the samples.
    pub range_coverage: f64,
}

impl RangeStatistics {
    /// `None` when `samples` is empty; empty ranges carry no report.
    pub fn compute(range: &Range, samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mean = mean(samples);
        let std_dev = population_std(samples);
        let (min, max) = min_max(samples);
        let expected_mean = range.theoretical_mean();
        let expected_std = range.theoretical_std();

        Some(Self {
            total_samples: samples.len(),
            mean,
            std_dev,
            min,
            max,
            expected_mean,
            expected_std,
            mean_bias: mean - expected_mean,
            std_ratio: std_dev / expected_std,
            range_coverage: (max - min) / range.width(),
        })
    }
}

// ---------------------------------------------------------------------------
// Per-run summaries
// ---------------------------------------------------------------------------

/// Plain summary of one run's samples for one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q25: f64,
    pub q75: f64,
}

impl SampleSummary {
    pub fn compute(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let (min, max) = min_max(samples);
        Some(Self {
            count: samples.len(),
            mean: mean(samples),
            std: population_std(samples),
            min,
            max,
            median: percentile(&sorted, 50.0),
            q25: percentile(&sorted, 25.0),
            q75: percentile(&sorted, 75.0),
        })
    }
}

/// Summaries for every run and every non-empty range sample set in it.
/// Runs with no non-empty sample set still appear, with an empty map.
pub fn run_statistics(runs: &RunCollection) -> OrderedMap<OrderedMap<SampleSummary>> {
    runs.runs()
        .map(|(run_id, ranges)| {
            let summaries: OrderedMap<SampleSummary> = ranges
                .iter()
                .filter_map(|(key, samples)| SampleSummary::compute(samples).map(|s| (key, s)))
                .collect();
            (run_id, summaries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_statistics() {
        assert!(RangeStatistics::compute(&Range::new(0.0, 1.0), &[]).is_none());
        assert!(SampleSummary::compute(&[]).is_none());
    }

    #[test]
    fn test_midpoint_concentrated() {
        let range = Range::new(2.0, 8.0);
        let stats = RangeStatistics::compute(&range, &[5.0; 100]).unwrap();
        assert_eq!(stats.mean_bias, 0.0);
        assert!(stats.std_ratio.abs() < 1e-12);
        assert_eq!(stats.range_coverage, 0.0);
    }

    #[test]
    fn test_population_std() {
        // Known population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&data) - 2.0).abs() < 1e-12);
        assert_eq!(mean(&data), 5.0);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let range = Range::new(-10.0, 10.0);
        let data: Vec<f64> = (0..97).map(|i| (i as f64 * 0.731).sin() * 9.5).collect();
        let a = RangeStatistics::compute(&range, &data).unwrap();
        let b = RangeStatistics::compute(&range, &data).unwrap();
        assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        assert_eq!(a.std_dev.to_bits(), b.std_dev.to_bits());
        assert_eq!(a.range_coverage.to_bits(), b.range_coverage.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_percentile_linear() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 50.0), 2.5);
        assert_eq!(percentile(&sorted, 25.0), 1.75);
        assert_eq!(percentile(&sorted, 75.0), 3.25);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 4.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_sample_summary() {
        let s = SampleSummary::compute(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.median, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
    }

    #[test]
    fn test_run_statistics_skips_empty_sets() {
        let mut runs = RunCollection::new();
        runs.extend("run_1", "0.0-1.0", [0.25, 0.75]);
        runs.extend("run_1", "1.0-10.0", Vec::new());
        runs.extend("run_2", "0.0-1.0", Vec::new());
        let stats = run_statistics(&runs);
        assert_eq!(stats.len(), 2);
        let run_1 = stats.get("run_1").unwrap();
        assert!(run_1.contains_key("0.0-1.0"));
        assert!(!run_1.contains_key("1.0-10.0"));
        assert!(stats.get("run_2").unwrap().is_empty());
    }
}
