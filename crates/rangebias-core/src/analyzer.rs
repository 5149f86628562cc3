//! Analysis entry point.
//!
//! Pipeline: validate declared ranges → pool each range across runs →
//! [`RangeReport`] per non-empty pool → [`BiasSummary`] → per-range
//! [`ConsistencyReport`] → [`Summary`]. Pure and synchronous; no state
//! survives between calls, so independent analyses may run in parallel.

use rangebias_tests::{DEFAULT_BINS, DEFAULT_SIGNIFICANCE};
use serde::{Deserialize, Serialize};

use crate::bias::BiasSummary;
use crate::consistency::analyze_consistency;
use crate::error::AnalysisError;
use crate::map::OrderedMap;
use crate::range::{Range, validate_ranges};
use crate::report::{AnalysisReport, RangeReport, Summary};
use crate::samples::RunCollection;

/// Tunables for the uniformity tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// A test accepts uniformity when its p-value is strictly above this.
    pub significance: f64,
    /// Equal-width bins for the chi-square test; `bins - 1` degrees of freedom.
    pub chi_square_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
            chi_square_bins: DEFAULT_BINS,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(AnalysisError::InvalidConfig {
                reason: format!("significance must be in (0, 1), got {}", self.significance),
            });
        }
        if self.chi_square_bins < 2 {
            return Err(AnalysisError::InvalidConfig {
                reason: format!(
                    "chi-square needs at least 2 bins, got {}",
                    self.chi_square_bins
                ),
            });
        }
        Ok(())
    }
}

/// Stateless analyzer holding only its configuration.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `runs` against the declared `ranges`.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Domain`] / [`AnalysisError::DuplicateRange`] for a
    ///   bad range list, before any statistic is computed.
    /// - [`AnalysisError::EmptyInput`] when no declared range has a single
    ///   sample in any run.
    ///
    /// Ranges with no samples are left out of the report. Samples filed
    /// under keys that match no declared range are ignored.
    pub fn analyze(
        &self,
        runs: &RunCollection,
        ranges: &[Range],
    ) -> Result<AnalysisReport, AnalysisError> {
        validate_ranges(ranges)?;
        log_undeclared_keys(runs, ranges);

        let mut range_analysis = OrderedMap::new();
        for range in ranges {
            let key = range.key();
            let pooled = runs.pooled(&key);
            match RangeReport::compute(range, &pooled, &self.config)? {
                Some(report) => {
                    range_analysis.insert(key, report);
                }
                None => log::debug!("range {key}: no samples in any run, skipped"),
            }
        }

        let bias_analysis = BiasSummary::aggregate(&range_analysis)?;
        let consistency_analysis = analyze_consistency(runs, ranges);
        let summary = Summary::assemble(&range_analysis, &bias_analysis, &consistency_analysis);

        log::info!(
            "analyzed {}/{} ranges over {} runs: overall bias {:+.4}, KS uniform {}, chi2 uniform {}",
            summary.total_ranges_tested,
            ranges.len(),
            runs.run_count(),
            summary.overall_bias,
            summary.uniformity_findings.ks_test_uniform,
            summary.uniformity_findings.chi2_test_uniform,
        );

        Ok(AnalysisReport {
            range_analysis,
            bias_analysis,
            consistency_analysis,
            summary,
            config: self.config,
        })
    }
}

/// Analyze with the default configuration (alpha 0.05, ten chi-square bins).
pub fn analyze(runs: &RunCollection, ranges: &[Range]) -> Result<AnalysisReport, AnalysisError> {
    Analyzer::default().analyze(runs, ranges)
}

fn log_undeclared_keys(runs: &RunCollection, ranges: &[Range]) {
    let declared: Vec<String> = ranges.iter().map(Range::key).collect();
    for (run_id, samples) in runs.runs() {
        for key in samples.keys() {
            if !declared.iter().any(|d| d == key) {
                log::debug!("{run_id}: samples under undeclared range {key} ignored");
            }
        }
    }
}
