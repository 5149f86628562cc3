//! Goodness-of-fit battery for samples mapped onto the unit interval.
//!
//! Every test takes values already normalized to `[0, 1]` and checks them
//! against the continuous Uniform(0, 1) law. Each test returns a
//! [`TestResult`] with the raw statistic, a p-value (where applicable), a
//! pass/fail determination at the caller's significance level, and a
//! human-readable details line.

use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::f64::consts::PI;

/// Significance level used when the caller has no preference.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Number of equal-width chi-square bins used when the caller has no preference.
pub const DEFAULT_BINS: usize = 10;

/// Below this many samples per bin the chi-square approximation is unreliable.
pub const MIN_EXPECTED_PER_BIN: f64 = 5.0;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single goodness-of-fit test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
}

impl TestResult {
    /// Uniformity is accepted only when the p-value is strictly above the
    /// significance level. A missing p-value never passes.
    pub fn pass_from_p(p: Option<f64>, significance: f64) -> bool {
        match p {
            Some(p) => p > significance,
            None => false,
        }
    }
}

/// Return a failing `TestResult` when there is nothing to test.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Edges of `bins` equal-width bins over `[0, 1]`.
///
/// Edge `i` is `i * (1 / bins)` with the final edge pinned to exactly 1.0, so
/// values such as 0.3 may fall just below the third edge.
pub fn bin_edges(bins: usize) -> Vec<f64> {
    let step = 1.0 / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| i as f64 * step).collect();
    if let Some(last) = edges.last_mut() {
        *last = 1.0;
    }
    edges
}

/// Count values per bin. Bins are half-open `[lo, hi)` except the last,
/// which also includes 1.0. Values outside `[0, 1]` are not counted.
pub fn histogram(normalized: &[f64], bins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; bins];
    if bins == 0 {
        return counts;
    }
    let edges = bin_edges(bins);
    for &z in normalized {
        if !(0.0..=1.0).contains(&z) {
            continue;
        }
        // First edge strictly greater than z, minus one.
        let idx = edges.partition_point(|&e| e <= z).saturating_sub(1);
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Survival function of the Kolmogorov distribution, `P(K > lambda)`.
///
/// Uses the theta-function form for small arguments, where the alternating
/// series converges too slowly to be useful.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        let y = (-PI * PI / (8.0 * lambda * lambda)).exp();
        let cdf = (2.0 * PI).sqrt() / lambda * (y + y.powi(9) + y.powi(25) + y.powi(49));
        (1.0 - cdf).clamp(0.0, 1.0)
    } else {
        let x = (-2.0 * lambda * lambda).exp();
        (2.0 * (x - x.powi(4) + x.powi(9) - x.powi(16))).clamp(0.0, 1.0)
    }
}

/// Two-sided one-sample KS p-value for statistic `d` over `n` samples,
/// with Stephens' small-sample correction.
pub fn kolmogorov_p_value(d: f64, n: usize) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let sqrt_n = (n as f64).sqrt();
    kolmogorov_sf((sqrt_n + 0.12 + 0.11 / sqrt_n) * d)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Distribution tests
// ═══════════════════════════════════════════════════════════════════════════════

/// Kolmogorov-Smirnov test against the continuous Uniform(0, 1) CDF.
pub fn ks_uniform(normalized: &[f64], significance: f64) -> TestResult {
    let name = "Kolmogorov-Smirnov";
    let n = normalized.len();
    if n == 0 {
        return insufficient(name, 1, 0);
    }
    let mut sorted = normalized.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // D = max(D+, D-) with F(x) = x on [0, 1]
    let nf = n as f64;
    let mut d_plus = 0.0f64;
    let mut d_minus = 0.0f64;
    for (i, &x) in sorted.iter().enumerate() {
        let f_x = x.clamp(0.0, 1.0);
        d_plus = d_plus.max((i + 1) as f64 / nf - f_x);
        d_minus = d_minus.max(f_x - i as f64 / nf);
    }
    let d_max = d_plus.max(d_minus);
    let p = kolmogorov_p_value(d_max, n);

    TestResult {
        name: name.to_string(),
        passed: TestResult::pass_from_p(Some(p), significance),
        p_value: Some(p),
        statistic: d_max,
        details: format!("D={d_max:.6}, D+={d_plus:.6}, D-={d_minus:.6}, n={n}"),
    }
}

/// Pearson chi-square test over `bins` equal-width bins of `[0, 1]`, with
/// `n / bins` expected per bin and `bins - 1` degrees of freedom.
///
/// The test still runs when fewer than [`MIN_EXPECTED_PER_BIN`] samples are
/// expected per bin; the details string flags the result as approximate.
pub fn chi_squared_uniform(normalized: &[f64], bins: usize, significance: f64) -> TestResult {
    let name = "Chi-Squared Uniformity";
    let n = normalized.len();
    if n == 0 {
        return insufficient(name, 1, 0);
    }
    if bins < 2 {
        return insufficient(name, 2, bins);
    }
    let observed = histogram(normalized, bins);
    let expected = n as f64 / bins as f64;
    let chi2: f64 = observed
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let df = (bins - 1) as f64;
    let p = ChiSquared::new(df).map(|dist| dist.sf(chi2)).ok();

    let mut details = format!("bins={bins}, expected_per_bin={expected:.2}, df={df}");
    if expected < MIN_EXPECTED_PER_BIN {
        details.push_str(" (approximate: sparse bins)");
    }
    TestResult {
        name: name.to_string(),
        passed: TestResult::pass_from_p(p, significance),
        p_value: p,
        statistic: chi2,
        details,
    }
}
