//! Results and analysis file formats.
//!
//! A results file is what a generation run leaves behind:
//!
//! ```json
//! {
//!   "ranges": [[0.0, 1.0], [1.0, 10.0]],
//!   "samples_per_range": 200,
//!   "runs": 5,
//!   "prompt_type": "direct",
//!   "data": { "run_1": { "0.0-1.0": [0.42, ...], "1.0-10.0": [...] }, ... },
//!   "statistics": { "run_1": { "0.0-1.0": { "count": 200, ... } } }
//! }
//! ```
//!
//! A saved analysis wraps that object under `"results"`; both layouts load.

use std::path::Path;

use rangebias_core::{
    AnalysisConfig, AnalysisReport, BiasSummary, ConsistencyReport, OrderedMap, Range,
    RangeReport, RunCollection, SampleSummary, Summary, run_statistics,
};
use serde::{Deserialize, Serialize};

/// Output of one generation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsFile {
    pub ranges: Vec<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_per_range: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<String>,
    pub data: RunCollection,
    /// Recomputed from `data` on write; ignored on read.
    #[serde(default, skip_deserializing)]
    pub statistics: OrderedMap<OrderedMap<SampleSummary>>,
}

impl ResultsFile {
    pub fn new(ranges: Vec<Range>, data: RunCollection) -> Self {
        let statistics = run_statistics(&data);
        Self {
            ranges,
            samples_per_range: None,
            runs: None,
            prompt_type: None,
            data,
            statistics,
        }
    }

    /// Parse either layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let mut value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;
        if value.get("data").is_none() {
            if let Some(nested) = value.get_mut("results").map(serde_json::Value::take) {
                value = nested;
            }
        }
        if value.get("data").is_none() || value.get("ranges").is_none() {
            return Err("could not find 'data' and 'ranges' in results file".to_string());
        }
        let mut results: ResultsFile =
            serde_json::from_value(value).map_err(|e| format!("malformed results file: {e}"))?;
        results.statistics = run_statistics(&results.data);
        Ok(results)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        write_json(path, self)
    }
}

#[derive(Serialize)]
struct AnalysisBody<'a> {
    range_analysis: &'a OrderedMap<RangeReport>,
    bias_analysis: &'a BiasSummary,
    consistency_analysis: &'a OrderedMap<ConsistencyReport>,
}

/// Saved analysis: the input results, the analysis and its summary.
#[derive(Serialize)]
pub struct AnalysisFile<'a> {
    results: &'a ResultsFile,
    analysis: AnalysisBody<'a>,
    summary: &'a Summary,
    config: &'a AnalysisConfig,
}

impl<'a> AnalysisFile<'a> {
    pub fn new(results: &'a ResultsFile, report: &'a AnalysisReport) -> Self {
        Self {
            results,
            analysis: AnalysisBody {
                range_analysis: &report.range_analysis,
                bias_analysis: &report.bias_analysis,
                consistency_analysis: &report.consistency_analysis,
            },
            summary: &report.summary,
            config: &report.config,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        write_json(path, self)
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize {}: {e}", path.display()))?;
    std::fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))
}
