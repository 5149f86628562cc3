//! Uniformity verdict for one range's pooled samples.
//!
//! Samples are mapped onto `[0, 1]` and handed to the goodness-of-fit battery
//! in `rangebias-tests`. The two tests are reported side by side and never
//! merged; disagreement between them says something about test sensitivity,
//! not about an error.

use rangebias_tests::{MIN_EXPECTED_PER_BIN, chi_squared_uniform, ks_uniform};
use serde::Serialize;

use crate::analyzer::AnalysisConfig;
use crate::error::AnalysisError;
use crate::range::Range;

/// KS and chi-square results against Uniform(lower, upper).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UniformityVerdict {
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    pub is_uniform_ks: bool,
    pub chi2_statistic: f64,
    pub chi2_p_value: f64,
    pub is_uniform_chi2: bool,
}

impl UniformityVerdict {
    /// Whether both tests reached the same conclusion.
    pub fn tests_agree(&self) -> bool {
        self.is_uniform_ks == self.is_uniform_chi2
    }
}

/// Map every sample onto the unit interval of `range`.
pub fn normalize(range: &Range, samples: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    range.validate()?;
    Ok(samples.iter().map(|&x| range.normalize(x)).collect())
}

/// Test `samples` for consistency with Uniform(range.lower, range.upper).
pub fn test_uniformity(
    range: &Range,
    samples: &[f64],
    config: &AnalysisConfig,
) -> Result<UniformityVerdict, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::NoSamples { range: range.key() });
    }
    let normalized = normalize(range, samples)?;

    let expected_per_bin = samples.len() as f64 / config.chi_square_bins as f64;
    if expected_per_bin < MIN_EXPECTED_PER_BIN {
        log::warn!(
            "range {}: {} samples over {} bins; chi-square p-value is approximate",
            range.key(),
            samples.len(),
            config.chi_square_bins
        );
    }

    let ks = ks_uniform(&normalized, config.significance);
    let chi2 = chi_squared_uniform(&normalized, config.chi_square_bins, config.significance);
    for result in [&ks, &chi2] {
        log::debug!("range {}: {}: {}", range.key(), result.name, result.details);
    }

    // Both tests only omit a p-value for empty input or < 2 bins, which are
    // rejected above and by config validation.
    Ok(UniformityVerdict {
        ks_statistic: ks.statistic,
        ks_p_value: ks.p_value.unwrap_or(0.0),
        is_uniform_ks: ks.passed,
        chi2_statistic: chi2.statistic,
        chi2_p_value: chi2.p_value.unwrap_or(0.0),
        is_uniform_chi2: chi2.passed,
    })
}
