//! Run-to-run stability of each range's mean and spread.
//!
//! For every declared range, each run that produced a non-empty sample set
//! contributes one mean and one standard deviation. The spread of those
//! per-run figures is what this module reports.
//!
//! # Undefined coefficients of variation
//!
//! A CV is `std / mean`. When the mean of the per-run figures is zero (a
//! symmetric range such as `(-1, 1)` with perfectly balanced output, or every
//! run constant for `cv_std`) the CV is reported as `None` and serializes as
//! `null`. It is never NaN or infinite. A negative mean gives a negative CV.
//!
//! "Zero" allows for rounding: balanced samples such as `[0.1, 0.2, -0.3]`
//! leave a mean around `1e-17`, not `0.0`. A mean counts as zero when
//! `|mean| <= f64::EPSILON * scale * n`, where `scale` is the largest
//! absolute sample and `n` the number of samples across the qualifying runs
//! ([`cancellation_tolerance`]). That bounds the error summation can
//! accumulate, so anything inside it carries no sign or magnitude.

use serde::Serialize;

use crate::map::OrderedMap;
use crate::range::Range;
use crate::samples::RunCollection;
use crate::stats::{mean, population_std};

/// Cross-run stability of one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    /// Std of per-run means. Lower is more consistent.
    pub mean_consistency: f64,
    /// Std of per-run stds.
    pub std_consistency: f64,
    /// `mean_consistency / mean(run_means)`; `None` when that mean is zero
    /// within rounding.
    pub cv_mean: Option<f64>,
    /// `std_consistency / mean(run_stds)`; `None` when that mean is zero
    /// within rounding.
    pub cv_std: Option<f64>,
    pub run_ids: Vec<String>,
    pub run_means: Vec<f64>,
    pub run_stds: Vec<f64>,
}

/// `std / mean`, or `None` when `|mean| <= tolerance`.
pub fn coefficient_of_variation(std: f64, mean: f64, tolerance: f64) -> Option<f64> {
    if mean.abs() <= tolerance {
        None
    } else {
        Some(std / mean)
    }
}

/// Largest rounding error expected when averaging `n` values no larger than
/// `scale` in magnitude.
pub fn cancellation_tolerance(scale: f64, n: usize) -> f64 {
    f64::EPSILON * scale * n as f64
}

impl ConsistencyReport {
    /// Build from the non-empty per-run sample sets of one range.
    /// `None` when no run qualifies.
    pub fn from_runs<'a>(runs: impl IntoIterator<Item = (&'a str, &'a [f64])>) -> Option<Self> {
        let mut run_ids = Vec::new();
        let mut run_means = Vec::new();
        let mut run_stds = Vec::new();
        let mut scale = 0.0f64;
        let mut count = 0usize;
        for (run_id, samples) in runs {
            if samples.is_empty() {
                continue;
            }
            scale = samples.iter().fold(scale, |m, x| m.max(x.abs()));
            count += samples.len();
            run_ids.push(run_id.to_string());
            run_means.push(mean(samples));
            run_stds.push(population_std(samples));
        }
        if run_means.is_empty() {
            return None;
        }

        let mean_consistency = population_std(&run_means);
        let std_consistency = population_std(&run_stds);
        let tolerance = cancellation_tolerance(scale, count);
        Some(Self {
            mean_consistency,
            std_consistency,
            cv_mean: coefficient_of_variation(mean_consistency, mean(&run_means), tolerance),
            cv_std: coefficient_of_variation(std_consistency, mean(&run_stds), tolerance),
            run_ids,
            run_means,
            run_stds,
        })
    }
}

/// Consistency report for every declared range with at least one qualifying
/// run, in declaration order.
pub fn analyze_consistency(runs: &RunCollection, ranges: &[Range]) -> OrderedMap<ConsistencyReport> {
    let mut out = OrderedMap::new();
    for range in ranges {
        let key = range.key();
        match ConsistencyReport::from_runs(runs.qualifying_runs(&key)) {
            Some(report) => {
                if report.cv_mean.is_none() {
                    log::warn!("range {key}: mean of run means is zero, cv_mean undefined");
                }
                if report.cv_std.is_none() {
                    log::warn!("range {key}: mean of run stds is zero, cv_std undefined");
                }
                out.insert(key, report);
            }
            None => log::debug!("range {key}: no run produced samples, no consistency signal"),
        }
    }
    out
}
