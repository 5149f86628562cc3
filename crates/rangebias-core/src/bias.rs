//! Cross-range bias aggregation.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::map::OrderedMap;
use crate::report::RangeReport;
use crate::stats::{mean, population_std};

/// How the mean bias varies across all analyzed ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasSummary {
    pub mean_bias: f64,
    /// Population standard deviation of the per-range biases.
    pub bias_std: f64,
    /// Largest bias minus smallest bias.
    pub bias_range: f64,
    /// Range key → bias, in range order.
    pub bias_by_range: OrderedMap<f64>,
}

impl BiasSummary {
    /// Aggregate the biases of every range report.
    ///
    /// Fails with [`AnalysisError::EmptyInput`] when there are no reports:
    /// every declared range came back without usable samples.
    pub fn aggregate(reports: &OrderedMap<RangeReport>) -> Result<Self, AnalysisError> {
        if reports.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let bias_by_range: OrderedMap<f64> = reports
            .iter()
            .map(|(key, report)| (key, report.statistics.mean_bias))
            .collect();
        let biases: Vec<f64> = bias_by_range.values().copied().collect();
        let max = biases.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = biases.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(Self {
            mean_bias: mean(&biases),
            bias_std: population_std(&biases),
            bias_range: max - min,
            bias_by_range,
        })
    }

    /// Range with the largest absolute bias. Ties go to the earliest range.
    pub fn most_biased(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (key, &bias) in self.bias_by_range.iter() {
            match best {
                Some((_, b)) if b.abs() >= bias.abs() => {}
                _ => best = Some((key, bias)),
            }
        }
        best
    }
}
