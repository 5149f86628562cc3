use std::path::Path;

use rangebias_core::{
    AnalysisConfig, AnalysisReport, Analyzer, ConsistencyReport, RangeReport, SampleSummary,
};
use serde::Serialize;

use crate::results::{AnalysisFile, ResultsFile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnalyzeView {
    Summary,
    Detailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnalyzeStatus {
    Good,
    Warning,
    Critical,
}

/// Run-to-run stability of a range's mean, graded on `|cv_mean|`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyLevel {
    High,
    Medium,
    Low,
}

struct RangeInterpretation {
    status: AnalyzeStatus,
    findings: Vec<String>,
    strengths: Vec<String>,
    notes: Vec<String>,
    meaning: &'static str,
}

pub struct AnalyzeCommandConfig<'a> {
    pub path: &'a str,
    pub output_path: Option<&'a str>,
    pub view: &'a str,
    pub significance: f64,
    pub chi_square_bins: usize,
}

pub fn run(cfg: AnalyzeCommandConfig<'_>) {
    let view = AnalyzeView::parse(cfg.view);
    let results = ResultsFile::load(Path::new(cfg.path)).unwrap_or_else(|e| super::fail(e));
    let analyzer = Analyzer::new(AnalysisConfig {
        significance: cfg.significance,
        chi_square_bins: cfg.chi_square_bins,
    })
    .unwrap_or_else(|e| super::fail(e));

    let config = analyzer.config();
    println!(
        "Analyzing {} range(s) over {} run(s), {} samples (view: {}, alpha: {}, bins: {})...",
        results.ranges.len(),
        results.data.run_count(),
        results.data.total_samples(),
        view.as_str(),
        config.significance,
        config.chi_square_bins
    );

    let report = analyzer
        .analyze(&results.data, &results.ranges)
        .unwrap_or_else(|e| super::fail(e));

    let mut status_counts = [0usize; 3];
    for (key, range_report) in report.range_analysis.iter() {
        let consistency = report.consistency_analysis.get(key);
        let interpretation = interpret_range(range_report, consistency);
        match interpretation.status {
            AnalyzeStatus::Good => status_counts[0] += 1,
            AnalyzeStatus::Warning => status_counts[1] += 1,
            AnalyzeStatus::Critical => status_counts[2] += 1,
        }
        match view {
            AnalyzeView::Summary => print_range_summary(key, range_report, &interpretation),
            AnalyzeView::Detailed => print_range_detailed(
                key,
                range_report,
                consistency,
                &results,
                &interpretation,
            ),
        }
    }

    let skipped = results.ranges.len() - report.range_analysis.len();
    if skipped > 0 {
        println!("\n  {skipped} declared range(s) had no samples and were skipped.");
    }

    print_report_summary(&report, status_counts);

    if let Some(path) = cfg.output_path {
        save_analysis(&results, &report, Path::new(path)).unwrap_or_else(|e| super::fail(e));
        println!("\nResults written to {path}");
    }
}

fn save_analysis(
    results: &ResultsFile,
    report: &AnalysisReport,
    path: &Path,
) -> Result<(), String> {
    AnalysisFile::new(results, report).save(path)
}

fn print_report_summary(report: &AnalysisReport, status_counts: [usize; 3]) {
    let summary = &report.summary;
    let findings = &summary.uniformity_findings;

    println!("\n{:=<68}", "");
    println!(
        "Analysis Summary: {} good, {} warning, {} critical",
        status_counts[0], status_counts[1], status_counts[2]
    );
    println!("{:=<68}", "");
    println!("  Ranges tested:        {}", summary.total_ranges_tested);
    println!("  Overall bias:         {:+.4}", summary.overall_bias);
    println!(
        "  Bias spread:          std={:.4} range={:.4}",
        report.bias_analysis.bias_std, report.bias_analysis.bias_range
    );
    println!("  Most biased range:    {}", summary.most_biased_range);
    println!(
        "  Lowest CV (mean):     {}",
        summary.least_consistent_range.as_deref().unwrap_or("n/a")
    );
    println!(
        "  KS uniform:           {} ({:.0}%)",
        findings.ks_test_uniform,
        findings.ks_uniformity_rate * 100.0
    );
    println!(
        "  Chi-square uniform:   {} ({:.0}%)",
        findings.chi2_test_uniform,
        findings.chi2_uniformity_rate * 100.0
    );

    if status_counts[2] > 0 {
        println!("Verdict: the oracle is not sampling uniformly in at least one range.");
    } else if status_counts[1] > 0 {
        println!("Verdict: mostly uniform, with deviations worth a closer look.");
    } else {
        println!("Verdict: no evidence against uniform sampling in any range.");
    }
}

fn print_range_summary(key: &str, r: &RangeReport, i: &RangeInterpretation) {
    println!();
    println!("  ┌─ {key} ({} samples)", r.statistics.total_samples);
    println!(
        "  │ Status: {} ({} finding(s))",
        i.status.as_str(),
        i.findings.len()
    );

    if i.findings.is_empty() {
        println!("  │ Findings: none");
    } else {
        for finding in &i.findings {
            println!("  │ Finding: {finding}");
        }
    }

    for strength in &i.strengths {
        println!("  │ Strength: {strength}");
    }

    for note in &i.notes {
        println!("  │ Note: {note}");
    }

    println!("  │ What this means: {}", i.meaning);
    println!("  └─");
}

fn print_range_detailed(
    key: &str,
    r: &RangeReport,
    consistency: Option<&ConsistencyReport>,
    results: &ResultsFile,
    i: &RangeInterpretation,
) {
    let s = &r.statistics;
    let u = &r.uniformity;

    println!();
    println!("  ┌─ {key} ({} samples)", s.total_samples);
    println!("  │ Status: {}", i.status.as_str());
    println!(
        "  │ Mean:             {:.4} (expected {:.4}, bias {:+.4})",
        s.mean, s.expected_mean, s.mean_bias
    );
    println!(
        "  │ Std:              {:.4} (expected {:.4}, ratio {:.3})",
        s.std_dev, s.expected_std, s.std_ratio
    );
    println!(
        "  │ Span:             [{}, {}] coverage={:.3}",
        s.min, s.max, s.range_coverage
    );
    println!(
        "  │ KS:               D={:.4} p={:.4} [{}]",
        u.ks_statistic,
        u.ks_p_value,
        verdict(u.is_uniform_ks)
    );
    println!(
        "  │ Chi-square:       X2={:.2} p={:.4} [{}]",
        u.chi2_statistic,
        u.chi2_p_value,
        verdict(u.is_uniform_chi2)
    );

    if let Some(c) = consistency {
        println!(
            "  │ Consistency:      {} run(s), std(means)={:.4} std(stds)={:.4} cv_mean={} cv_std={}",
            c.run_ids.len(),
            c.mean_consistency,
            c.std_consistency,
            fmt_cv(c.cv_mean),
            fmt_cv(c.cv_std)
        );
    }

    for note in &i.notes {
        println!("  │ Note: {note}");
    }

    for (run_id, per_range) in results.statistics.iter() {
        if let Some(summary) = per_range.get(key) {
            println!("  │   {run_id:>8}: {}", fmt_summary(summary));
        }
    }

    println!("  │ What this means: {}", i.meaning);
    println!("  └─");
}

fn interpret_range(r: &RangeReport, consistency: Option<&ConsistencyReport>) -> RangeInterpretation {
    let mut warnings = 0usize;
    let mut criticals = 0usize;
    let mut findings = Vec::new();
    let mut strengths = Vec::new();
    let mut notes = Vec::new();
    let s = &r.statistics;

    let relative_bias = s.mean_bias.abs() / r.range.width();
    if relative_bias > 0.10 {
        criticals += 1;
        findings.push(format!(
            "Mean is off-center by {:.1}% of the range width (bias {:+.4}).",
            relative_bias * 100.0,
            s.mean_bias
        ));
    } else if relative_bias > 0.03 {
        warnings += 1;
        findings.push(format!(
            "Mean drifts {:.1}% of the range width from the midpoint.",
            relative_bias * 100.0
        ));
    } else {
        strengths.push(format!("Mean is centered (bias {:+.4}).", s.mean_bias));
    }

    let coverage = s.range_coverage;
    if coverage < 0.5 {
        criticals += 1;
        findings.push(format!(
            "Samples span only {:.0}% of the range.",
            coverage * 100.0
        ));
    } else if coverage < 0.8 {
        warnings += 1;
        findings.push(format!(
            "Samples leave part of the range unused (coverage {coverage:.2})."
        ));
    } else {
        strengths.push(format!("Range coverage is wide ({coverage:.2})."));
    }

    let spread_error = (s.std_ratio - 1.0).abs();
    if spread_error > 0.5 {
        criticals += 1;
        findings.push(format!(
            "Spread is far from uniform (std ratio {:.2}).",
            s.std_ratio
        ));
    } else if spread_error > 0.2 {
        warnings += 1;
        findings.push(format!(
            "Spread deviates from uniform (std ratio {:.2}).",
            s.std_ratio
        ));
    } else {
        strengths.push(format!("Spread matches uniform (std ratio {:.2}).", s.std_ratio));
    }

    let u = &r.uniformity;
    if !u.tests_agree() {
        warnings += 1;
        findings.push(format!(
            "Uniformity tests disagree (KS p={:.4}, chi-square p={:.4}).",
            u.ks_p_value, u.chi2_p_value
        ));
    } else if u.is_uniform_ks {
        strengths.push(format!(
            "Both uniformity tests accept (KS p={:.4}, chi-square p={:.4}).",
            u.ks_p_value, u.chi2_p_value
        ));
    } else {
        criticals += 1;
        findings.push(format!(
            "Both uniformity tests reject (KS p={:.4}, chi-square p={:.4}).",
            u.ks_p_value, u.chi2_p_value
        ));
    }

    if let Some(c) = consistency.filter(|c| c.run_ids.len() >= 2) {
        let relative_drift = c.mean_consistency / r.range.width();
        if relative_drift > 0.05 {
            warnings += 1;
            findings.push(format!(
                "Run means drift apart ({:.1}% of the range width).",
                relative_drift * 100.0
            ));
        } else {
            strengths.push(format!(
                "Runs agree with each other (std of means {:.4}).",
                c.mean_consistency
            ));
        }

        // A mean near zero makes the CV blow up without any drift behind it.
        let straddles_zero = r.range.lower < 0.0 && r.range.upper > 0.0;
        match c.cv_mean.map(|cv| (cv, ConsistencyLevel::from_cv(cv))) {
            None => notes.push(
                "Run-to-run CV is undefined: run means cancel out around zero.".to_string(),
            ),
            Some((cv, ConsistencyLevel::High)) => {
                strengths.push(format!("High run-to-run consistency (CV {cv:.4})."))
            }
            Some((cv, ConsistencyLevel::Medium)) => {
                notes.push(format!("Medium run-to-run consistency (CV {cv:.4})."))
            }
            Some((cv, ConsistencyLevel::Low)) if straddles_zero => notes.push(format!(
                "Low run-to-run consistency (CV {cv:.4}), inflated by a mean near zero."
            )),
            Some((cv, ConsistencyLevel::Low)) => {
                warnings += 1;
                findings.push(format!("Low run-to-run consistency (CV {cv:.4})."));
            }
        }
    }

    let (status, meaning) = if criticals > 0 {
        (
            AnalyzeStatus::Critical,
            "The oracle does not behave like a uniform sampler on this range.",
        )
    } else if warnings > 0 {
        (
            AnalyzeStatus::Warning,
            "Roughly uniform, but with a measurable skew; collect more samples before trusting it.",
        )
    } else {
        (
            AnalyzeStatus::Good,
            "No evidence against uniform sampling on this range.",
        )
    };

    RangeInterpretation {
        status,
        findings,
        strengths,
        notes,
        meaning,
    }
}

fn verdict(uniform: bool) -> &'static str {
    if uniform { "uniform" } else { "rejected" }
}

fn fmt_cv(cv: Option<f64>) -> String {
    cv.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn fmt_summary(s: &SampleSummary) -> String {
    format!(
        "n={} mean={:.4} std={:.4} min={} q25={:.4} median={:.4} q75={:.4} max={}",
        s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
    )
}

impl AnalyzeView {
    fn parse(s: &str) -> Self {
        match s {
            "detailed" => Self::Detailed,
            _ => Self::Summary,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detailed => "detailed",
        }
    }
}

impl ConsistencyLevel {
    /// High below 0.1, medium below 0.2, low otherwise. The sign of the CV
    /// only follows the sign of the mean, so it is ignored.
    pub fn from_cv(cv: f64) -> Self {
        let cv = cv.abs();
        if cv < 0.1 {
            Self::High
        } else if cv < 0.2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl AnalyzeStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangebias_core::{Range, RunCollection, analyze};

    fn report_for(range: Range, runs: &[Vec<f64>]) -> AnalysisReport {
        let mut collection = RunCollection::new();
        for (i, samples) in runs.iter().enumerate() {
            collection.extend(&format!("run_{}", i + 1), &range.key(), samples.clone());
        }
        analyze(&collection, &[range]).unwrap()
    }

    fn evenly_spaced(range: Range, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| range.lower + range.width() * (i as f64 + 0.5) / n as f64)
            .collect()
    }

    #[test]
    fn test_evenly_spaced_range_is_good() {
        let range = Range::new(1.0, 100.0);
        let samples = evenly_spaced(range, 200);
        let report = report_for(range, &[samples.clone(), samples]);
        let key = range.key();
        let i = interpret_range(
            report.range_analysis.get(&key).unwrap(),
            report.consistency_analysis.get(&key),
        );
        assert_eq!(i.status, AnalyzeStatus::Good, "findings: {:?}", i.findings);
        assert!(i.findings.is_empty());
    }

    #[test]
    fn test_midpoint_collapse_is_critical() {
        let range = Range::new(1.0, 100.0);
        let report = report_for(range, &[vec![50.5; 100]]);
        let key = range.key();
        let i = interpret_range(report.range_analysis.get(&key).unwrap(), None);
        assert_eq!(i.status, AnalyzeStatus::Critical);
        // Centered, but nothing else about it is uniform.
        assert!(i.strengths.iter().any(|s| s.contains("centered")));
        assert!(i.findings.len() >= 3);
    }

    #[test]
    fn test_lower_half_is_critical_on_bias() {
        let range = Range::new(0.0, 100.0);
        let samples = evenly_spaced(Range::new(0.0, 50.0), 200);
        let report = report_for(range, &[samples]);
        let i = interpret_range(report.range_analysis.get(&range.key()).unwrap(), None);
        assert_eq!(i.status, AnalyzeStatus::Critical);
        assert!(i.findings.iter().any(|f| f.contains("off-center")));
    }

    #[test]
    fn test_drifting_runs_warn() {
        let range = Range::new(0.0, 100.0);
        let low = evenly_spaced(Range::new(0.0, 80.0), 200);
        let high = evenly_spaced(Range::new(20.0, 100.0), 200);
        let report = report_for(range, &[low, high]);
        let key = range.key();
        let i = interpret_range(
            report.range_analysis.get(&key).unwrap(),
            report.consistency_analysis.get(&key),
        );
        assert!(i.findings.iter().any(|f| f.contains("drift apart")));
        assert_ne!(i.status, AnalyzeStatus::Good);
    }

    #[test]
    fn test_unstable_runs_have_low_consistency() {
        let range = Range::new(0.0, 100.0);
        let low = evenly_spaced(Range::new(0.0, 70.0), 200);
        let high = evenly_spaced(Range::new(30.0, 100.0), 200);
        let report = report_for(range, &[low, high]);
        let key = range.key();
        let i = interpret_range(
            report.range_analysis.get(&key).unwrap(),
            report.consistency_analysis.get(&key),
        );
        // Run means 35 and 65: CV 15 / 50 = 0.3.
        assert!(i.findings.iter().any(|f| f.contains("Low run-to-run consistency")));
        assert_ne!(i.status, AnalyzeStatus::Good);
    }

    #[test]
    fn test_stable_runs_have_high_consistency() {
        let range = Range::new(1.0, 100.0);
        let samples = evenly_spaced(range, 200);
        let report = report_for(range, &[samples.clone(), samples]);
        let key = range.key();
        let i = interpret_range(
            report.range_analysis.get(&key).unwrap(),
            report.consistency_analysis.get(&key),
        );
        assert!(i.strengths.iter().any(|s| s.contains("High run-to-run consistency")));
        assert!(i.notes.is_empty());
    }

    #[test]
    fn test_low_cv_around_zero_is_only_a_note() {
        let range = Range::new(-10.0, 10.0);
        // Run means 1 and 2: CV 0.5 / 1.5, but the drift is 2.5% of the width.
        let a = evenly_spaced(Range::new(-8.0, 10.0), 200);
        let b = evenly_spaced(Range::new(-6.0, 10.0), 200);
        let report = report_for(range, &[a, b]);
        let key = range.key();
        let i = interpret_range(
            report.range_analysis.get(&key).unwrap(),
            report.consistency_analysis.get(&key),
        );
        assert!(i.notes.iter().any(|n| n.contains("inflated by a mean near zero")));
        assert!(!i.findings.iter().any(|f| f.contains("run-to-run")));
    }

    #[test]
    fn test_undefined_cv_is_a_note() {
        let range = Range::new(-10.0, 10.0);
        let a = evenly_spaced(Range::new(-10.0, 9.0), 200);
        let b = evenly_spaced(Range::new(-9.0, 10.0), 200);
        let report = report_for(range, &[a, b]);
        let key = range.key();
        assert_eq!(report.consistency_analysis.get(&key).unwrap().cv_mean, None);
        let i = interpret_range(
            report.range_analysis.get(&key).unwrap(),
            report.consistency_analysis.get(&key),
        );
        assert!(i.notes.iter().any(|n| n.contains("undefined")));
        assert!(!i.findings.iter().any(|f| f.contains("run-to-run")));
    }

    #[test]
    fn test_consistency_levels() {
        assert_eq!(ConsistencyLevel::from_cv(0.0), ConsistencyLevel::High);
        assert_eq!(ConsistencyLevel::from_cv(0.099), ConsistencyLevel::High);
        assert_eq!(ConsistencyLevel::from_cv(-0.05), ConsistencyLevel::High);
        assert_eq!(ConsistencyLevel::from_cv(0.1), ConsistencyLevel::Medium);
        assert_eq!(ConsistencyLevel::from_cv(-0.15), ConsistencyLevel::Medium);
        assert_eq!(ConsistencyLevel::from_cv(0.2), ConsistencyLevel::Low);
        assert_eq!(ConsistencyLevel::from_cv(3.0), ConsistencyLevel::Low);
    }

    // -----------------------------------------------------------------------
    // Output file
    // -----------------------------------------------------------------------

    #[test]
    fn test_save_analysis_reports_write_failure() {
        let range = Range::new(0.0, 1.0);
        let mut data = RunCollection::new();
        data.extend("run_1", &range.key(), evenly_spaced(range, 20));
        let results = ResultsFile::new(vec![range], data);
        let report = analyze(&results.data, &results.ranges).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir").join("analysis.json");
        let err = save_analysis(&results, &report, &missing).unwrap_err();
        assert!(err.contains("failed to write"));

        let ok = dir.path().join("analysis.json");
        save_analysis(&results, &report, &ok).unwrap();
        assert!(ok.exists());
    }

    #[test]
    fn test_view_parse() {
        assert_eq!(AnalyzeView::parse("detailed"), AnalyzeView::Detailed);
        assert_eq!(AnalyzeView::parse("summary"), AnalyzeView::Summary);
        assert_eq!(AnalyzeView::parse("other"), AnalyzeView::Summary);
    }

    #[test]
    fn test_fmt_cv() {
        assert_eq!(fmt_cv(None), "n/a");
        assert_eq!(fmt_cv(Some(0.25)), "0.2500");
    }
}
