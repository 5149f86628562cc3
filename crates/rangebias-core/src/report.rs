//! Report records produced by one [`crate::analyze`] call.
//!
//! Everything here is an immutable snapshot: built once, owned by the caller,
//! and serializable with range keys as JSON object keys in declaration order.

use serde::Serialize;

use crate::analyzer::AnalysisConfig;
use crate::bias::BiasSummary;
use crate::consistency::ConsistencyReport;
use crate::error::AnalysisError;
use crate::map::OrderedMap;
use crate::range::Range;
use crate::stats::RangeStatistics;
use crate::uniformity::{UniformityVerdict, test_uniformity};

/// Pooled statistics and uniformity verdict for one declared range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeReport {
    pub range: Range,
    #[serde(flatten)]
    pub statistics: RangeStatistics,
    #[serde(rename = "uniformity_test")]
    pub uniformity: UniformityVerdict,
}

impl RangeReport {
    /// `Ok(None)` for an empty pool; an invalid range is an error even then.
    pub fn compute(
        range: &Range,
        pooled: &[f64],
        config: &AnalysisConfig,
    ) -> Result<Option<Self>, AnalysisError> {
        range.validate()?;
        let Some(statistics) = RangeStatistics::compute(range, pooled) else {
            return Ok(None);
        };
        let uniformity = test_uniformity(range, pooled, config)?;
        Ok(Some(Self {
            range: *range,
            statistics,
            uniformity,
        }))
    }
}

/// Pass counts for the two uniformity tests across all range reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformityFindings {
    pub ks_passed: usize,
    pub chi2_passed: usize,
    pub total: usize,
    /// `"{ks_passed}/{total}"`
    pub ks_test_uniform: String,
    /// `"{chi2_passed}/{total}"`
    pub chi2_test_uniform: String,
    pub ks_uniformity_rate: f64,
    pub chi2_uniformity_rate: f64,
}

impl UniformityFindings {
    pub fn tally(reports: &OrderedMap<RangeReport>) -> Self {
        let total = reports.len();
        let ks_passed = reports.values().filter(|r| r.uniformity.is_uniform_ks).count();
        let chi2_passed = reports
            .values()
            .filter(|r| r.uniformity.is_uniform_chi2)
            .count();
        let rate = |passed: usize| {
            if total == 0 { 0.0 } else { passed as f64 / total as f64 }
        };
        Self {
            ks_passed,
            chi2_passed,
            total,
            ks_test_uniform: format!("{ks_passed}/{total}"),
            chi2_test_uniform: format!("{chi2_passed}/{total}"),
            ks_uniformity_rate: rate(ks_passed),
            chi2_uniformity_rate: rate(chi2_passed),
        }
    }
}

/// Headline figures of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_ranges_tested: usize,
    /// Mean bias across ranges.
    pub overall_bias: f64,
    /// Range with the largest absolute bias.
    pub most_biased_range: String,
    /// Range with the *lowest* defined `cv_mean`.
    ///
    /// Despite the name this is the most consistent range by CV. The
    /// selection rule is kept as-is for compatibility with existing result
    /// files; read it as "lowest cv_mean". Ranges whose `cv_mean` is
    /// undefined are not candidates; `None` when no range has one. Ties go
    /// to the earliest range.
    pub least_consistent_range: Option<String>,
    pub uniformity_findings: UniformityFindings,
}

impl Summary {
    pub fn assemble(
        reports: &OrderedMap<RangeReport>,
        bias: &BiasSummary,
        consistency: &OrderedMap<ConsistencyReport>,
    ) -> Self {
        let most_biased_range = bias
            .most_biased()
            .map(|(key, _)| key.to_string())
            .unwrap_or_default();

        let mut least_consistent: Option<(&str, f64)> = None;
        for (key, report) in consistency.iter() {
            let Some(cv) = report.cv_mean else { continue };
            match least_consistent {
                Some((_, best)) if best <= cv => {}
                _ => least_consistent = Some((key, cv)),
            }
        }

        Self {
            total_ranges_tested: reports.len(),
            overall_bias: bias.mean_bias,
            most_biased_range,
            least_consistent_range: least_consistent.map(|(key, _)| key.to_string()),
            uniformity_findings: UniformityFindings::tally(reports),
        }
    }
}

/// Root aggregate of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub range_analysis: OrderedMap<RangeReport>,
    pub bias_analysis: BiasSummary,
    pub consistency_analysis: OrderedMap<ConsistencyReport>,
    pub summary: Summary,
    pub config: AnalysisConfig,
}
