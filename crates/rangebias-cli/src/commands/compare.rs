use std::path::Path;

use rangebias_core::{AnalysisConfig, AnalysisReport, Analyzer, OrderedMap};
use serde::Serialize;

use super::analyze::ConsistencyLevel;
use crate::results::{ResultsFile, write_json};

pub struct CompareCommandConfig<'a> {
    pub paths: &'a [String],
    pub labels: Option<&'a str>,
    pub output_path: Option<&'a str>,
    pub significance: f64,
    pub chi_square_bins: usize,
}

/// One oracle's numbers on one range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub mean_bias: f64,
    /// `|mean_bias| / width`.
    pub relative_bias: f64,
    pub range_coverage: f64,
    pub ks_p_value: f64,
    pub is_uniform_ks: bool,
    pub chi2_p_value: f64,
    pub is_uniform_chi2: bool,
    pub cv_mean: Option<f64>,
    pub consistency: Option<ConsistencyLevel>,
}

/// Side-by-side view of several analyses, keyed by range then by label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub labels: Vec<String>,
    pub overall_bias: OrderedMap<f64>,
    pub ranges: OrderedMap<OrderedMap<CompareRow>>,
    /// Label with the smallest relative bias per range; ties go to the
    /// earlier label.
    pub least_biased: OrderedMap<String>,
}

impl Comparison {
    /// Ranges are listed in order of first appearance across the reports.
    pub fn build(reports: &[(String, AnalysisReport)]) -> Self {
        let mut ranges: OrderedMap<OrderedMap<CompareRow>> = OrderedMap::new();
        let mut overall_bias = OrderedMap::new();

        for (label, report) in reports {
            overall_bias.insert(label.as_str(), report.summary.overall_bias);
            for (key, r) in report.range_analysis.iter() {
                let s = &r.statistics;
                let u = &r.uniformity;
                let cv_mean = report
                    .consistency_analysis
                    .get(key)
                    .filter(|c| c.run_ids.len() >= 2)
                    .and_then(|c| c.cv_mean);
                let row = CompareRow {
                    mean_bias: s.mean_bias,
                    relative_bias: s.mean_bias.abs() / r.range.width(),
                    range_coverage: s.range_coverage,
                    ks_p_value: u.ks_p_value,
                    is_uniform_ks: u.is_uniform_ks,
                    chi2_p_value: u.chi2_p_value,
                    is_uniform_chi2: u.is_uniform_chi2,
                    cv_mean,
                    consistency: cv_mean.map(ConsistencyLevel::from_cv),
                };
                ranges.entry_or_default(key).insert(label.as_str(), row);
            }
        }

        let least_biased = ranges
            .iter()
            .filter_map(|(key, rows)| {
                let mut best: Option<(&str, f64)> = None;
                for (label, row) in rows.iter() {
                    if best.is_none_or(|(_, b)| row.relative_bias < b) {
                        best = Some((label, row.relative_bias));
                    }
                }
                best.map(|(label, _)| (key, label.to_string()))
            })
            .collect();

        Self {
            labels: reports.iter().map(|(label, _)| label.clone()).collect(),
            overall_bias,
            ranges,
            least_biased,
        }
    }
}

/// One label per path: the explicit comma-separated list, or file stems.
pub fn resolve_labels(paths: &[String], labels: Option<&str>) -> Result<Vec<String>, String> {
    if paths.len() < 2 {
        return Err("compare needs at least two results files".to_string());
    }
    let labels: Vec<String> = match labels {
        Some(list) => list.split(',').map(|l| l.trim().to_string()).collect(),
        None => paths
            .iter()
            .map(|p| {
                Path::new(p)
                    .file_stem()
                    .map_or_else(|| p.clone(), |s| s.to_string_lossy().into_owned())
            })
            .collect(),
    };
    if labels.len() != paths.len() {
        return Err(format!(
            "got {} label(s) for {} results file(s)",
            labels.len(),
            paths.len()
        ));
    }
    for (i, label) in labels.iter().enumerate() {
        if label.is_empty() {
            return Err(format!("empty label for {}", paths[i]));
        }
        if labels[..i].contains(label) {
            return Err(format!("duplicate label '{label}'; pass --labels to disambiguate"));
        }
    }
    Ok(labels)
}

pub fn run(cfg: CompareCommandConfig<'_>) {
    let labels = resolve_labels(cfg.paths, cfg.labels).unwrap_or_else(|e| super::fail(e));
    let analyzer = Analyzer::new(AnalysisConfig {
        significance: cfg.significance,
        chi_square_bins: cfg.chi_square_bins,
    })
    .unwrap_or_else(|e| super::fail(e));

    println!("Comparing {} results file(s)...", cfg.paths.len());
    let mut reports = Vec::with_capacity(cfg.paths.len());
    for (path, label) in cfg.paths.iter().zip(labels) {
        let results = ResultsFile::load(Path::new(path)).unwrap_or_else(|e| super::fail(e));
        let report = analyzer
            .analyze(&results.data, &results.ranges)
            .unwrap_or_else(|e| super::fail(format!("{path}: {e}")));
        println!(
            "  {label:<20} {} range(s), {} run(s), {} samples",
            report.range_analysis.len(),
            results.data.run_count(),
            results.data.total_samples()
        );
        reports.push((label, report));
    }

    let comparison = Comparison::build(&reports);
    print_comparison(&comparison);

    if let Some(path) = cfg.output_path {
        write_json(Path::new(path), &comparison).unwrap_or_else(|e| super::fail(e));
        println!("\nComparison written to {path}");
    }
}

fn print_comparison(c: &Comparison) {
    for (key, rows) in c.ranges.iter() {
        println!("\n{:=<68}", "");
        println!("Range {key}");
        println!(
            "{:<20} {:>9} {:>7} {:>6} {:>7} {:>7} {:>9}",
            "Label", "Bias", "Rel", "Cover", "KS p", "X2 p", "CV"
        );
        println!("{}", "-".repeat(68));
        for (label, row) in rows.iter() {
            let cv = match (row.cv_mean, row.consistency) {
                (Some(cv), Some(level)) => format!("{cv:.3} {}", level.as_str()),
                _ => "n/a".to_string(),
            };
            println!(
                "{:<20} {:>+9.4} {:>6.1}% {:>6.2} {:>7.4} {:>7.4} {:>9}",
                label,
                row.mean_bias,
                row.relative_bias * 100.0,
                row.range_coverage,
                row.ks_p_value,
                row.chi2_p_value,
                cv
            );
        }
        if let Some(best) = c.least_biased.get(key) {
            println!("Least biased: {best}");
        }
    }

    println!("\n{:=<68}", "");
    println!("Overall bias");
    println!("{}", "-".repeat(68));
    for (label, bias) in c.overall_bias.iter() {
        println!("{label:<20} {bias:>+9.4}");
    }
}
