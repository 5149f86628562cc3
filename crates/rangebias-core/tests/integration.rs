//! Integration tests for rangebias-core.
//!
//! These tests drive the full pipeline:
//! run collection → per-range reports → bias → consistency → summary.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rangebias_core::{AnalysisError, Range, RangeStatistics, RunCollection, analyze};

fn uniform_run(rng: &mut StdRng, range: Range, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| rng.random_range(range.lower..range.upper))
        .collect()
}

#[test]
fn two_run_unit_interval_scenario() {
    let range = Range::new(0.0, 1.0);
    let mut runs = RunCollection::new();
    runs.extend(
        "run_1",
        "0.0-1.0",
        [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9],
    );
    runs.extend(
        "run_2",
        "0.0-1.0",
        [0.15, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.85, 0.95],
    );

    let report = analyze(&runs, &[range]).unwrap();
    let unit = report.range_analysis.get("0.0-1.0").unwrap();
    assert_eq!(unit.statistics.total_samples, 18);
    assert!((unit.statistics.mean - 0.525).abs() < 1e-12);
    assert_eq!(unit.statistics.expected_mean, 0.5);
    assert!((unit.statistics.mean_bias - 0.025).abs() < 1e-12);
    assert!((unit.statistics.range_coverage - 0.85).abs() < 1e-12);
    assert_eq!(unit.statistics.min, 0.1);
    assert_eq!(unit.statistics.max, 0.95);

    let consistency = report.consistency_analysis.get("0.0-1.0").unwrap();
    assert!((consistency.run_means[0] - 0.5).abs() < 1e-12);
    assert!((consistency.run_means[1] - 0.55).abs() < 1e-12);
    assert!((consistency.mean_consistency - 0.025).abs() < 1e-12);

    assert_eq!(report.summary.total_ranges_tested, 1);
    assert_eq!(report.summary.most_biased_range, "0.0-1.0");
    assert_eq!(
        report.summary.least_consistent_range.as_deref(),
        Some("0.0-1.0")
    );
}

#[test]
fn symmetric_range_zero_mean_single_run() {
    let mut runs = RunCollection::new();
    runs.extend("run_1", "-1.0-1.0", [-0.75, -0.5, 0.5, 0.75]);
    let report = analyze(&runs, &[Range::new(-1.0, 1.0)]).unwrap();
    let consistency = report.consistency_analysis.get("-1.0-1.0").unwrap();
    assert_eq!(consistency.mean_consistency, 0.0);
    assert_eq!(consistency.cv_mean, None);
    assert_eq!(report.summary.least_consistent_range, None);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["consistency_analysis"]["-1.0-1.0"]["cv_mean"].is_null());
}

#[test]
fn balanced_runs_with_rounding_residue_have_no_cv() {
    let mut runs = RunCollection::new();
    runs.extend("run_1", "-1.0-1.0", [0.1, 0.2, -0.3]);
    runs.extend("run_1", "0.0-1.0", [0.25, 0.75]);
    runs.extend("run_2", "-1.0-1.0", [0.3, -0.2, -0.1]);
    runs.extend("run_2", "0.0-1.0", [0.3, 0.8]);
    let report = analyze(&runs, &[Range::new(-1.0, 1.0), Range::new(0.0, 1.0)]).unwrap();

    let symmetric = report.consistency_analysis.get("-1.0-1.0").unwrap();
    // Run means are a few 1e-17 off zero, not exactly zero.
    assert!(symmetric.run_means.iter().all(|m| m.abs() < 1e-15));
    assert_eq!(symmetric.cv_mean, None);
    assert_eq!(
        report.summary.least_consistent_range.as_deref(),
        Some("0.0-1.0")
    );
}

#[test]
fn zero_width_range_is_domain_error() {
    let mut runs = RunCollection::new();
    runs.extend("run_1", "5.0-5.0", [5.0, 5.0]);
    let err = analyze(&runs, &[Range::new(5.0, 5.0)]).unwrap_err();
    assert!(matches!(err, AnalysisError::Domain { .. }));
}

#[test]
fn no_samples_anywhere_is_empty_input() {
    let ranges = [Range::new(0.0, 1.0), Range::new(1.0, 10.0)];
    let mut runs = RunCollection::new();
    runs.extend("run_1", "0.0-1.0", Vec::new());
    runs.extend("run_2", "1.0-10.0", Vec::new());
    assert_eq!(analyze(&runs, &ranges).unwrap_err(), AnalysisError::EmptyInput);
    assert_eq!(
        analyze(&RunCollection::new(), &ranges).unwrap_err(),
        AnalysisError::EmptyInput
    );
}

#[test]
fn sparse_ranges_are_skipped_not_fatal() {
    let ranges = [
        Range::new(0.0, 1.0),
        Range::new(1.0, 10.0),
        Range::new(-100.0, 0.0),
    ];
    let mut runs = RunCollection::new();
    runs.extend("run_1", "0.0-1.0", [0.2, 0.4, 0.6]);
    runs.extend("run_1", "1.0-10.0", Vec::new());
    runs.extend("run_2", "0.0-1.0", Vec::new());
    runs.extend("run_2", "-100.0-0.0", [-40.0, -60.0]);

    let report = analyze(&runs, &ranges).unwrap();
    let keys: Vec<_> = report.range_analysis.keys().collect();
    assert_eq!(keys, vec!["0.0-1.0", "-100.0-0.0"]);
    // Every consistency entry has a matching range report.
    for key in report.consistency_analysis.keys() {
        assert!(report.range_analysis.contains_key(key));
    }
    assert_eq!(
        report.consistency_analysis.get("0.0-1.0").unwrap().run_ids,
        vec!["run_1"]
    );
    assert_eq!(report.bias_analysis.bias_by_range.len(), 2);
}

#[test]
fn midpoint_concentrated_samples_are_rejected() {
    let range = Range::new(1.0, 100.0);
    let mut runs = RunCollection::new();
    runs.extend("run_1", &range.key(), vec![50.5; 200]);
    runs.extend("run_2", &range.key(), vec![50.5; 200]);
    let report = analyze(&runs, &[range]).unwrap();
    let r = report.range_analysis.get(&range.key()).unwrap();
    assert_eq!(r.statistics.mean_bias, 0.0);
    assert!(r.statistics.std_ratio.abs() < 1e-12);
    assert!(!r.uniformity.is_uniform_ks);
    assert!(!r.uniformity.is_uniform_chi2);
    assert_eq!(report.summary.uniformity_findings.ks_passed, 0);
    assert_eq!(report.summary.uniformity_findings.chi2_uniformity_rate, 0.0);
}

#[test]
fn lower_half_samples_show_negative_bias() {
    let range = Range::new(0.0, 100.0);
    let mut rng = StdRng::seed_from_u64(42);
    let samples = uniform_run(&mut rng, Range::new(0.0, 50.0), 2000);
    let stats = RangeStatistics::compute(&range, &samples).unwrap();
    let expected_bias = -range.width() / 4.0;
    assert!(
        (stats.mean_bias - expected_bias).abs() < 1.5,
        "bias {} too far from {expected_bias}",
        stats.mean_bias
    );
    assert!((stats.range_coverage - 0.5).abs() < 0.01);
    assert!(stats.std_ratio < 0.6);
}

#[test]
fn uniform_oracle_passes_ks_most_of_the_time() {
    let range = Range::new(-10.0, 10.0);
    let accepted = (0..20u64)
        .filter(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut runs = RunCollection::new();
            runs.extend("run_1", &range.key(), uniform_run(&mut rng, range, 600));
            let report = analyze(&runs, &[range]).unwrap();
            report.summary.uniformity_findings.ks_passed == 1
        })
        .count();
    assert!(accepted >= 16, "only {accepted}/20 seeded runs accepted");
}

#[test]
fn single_range_bias_has_no_spread() {
    let range = Range::new(1.0, 10.0);
    let mut rng = StdRng::seed_from_u64(7);
    let mut runs = RunCollection::new();
    runs.extend("run_1", &range.key(), uniform_run(&mut rng, range, 100));
    let report = analyze(&runs, &[range]).unwrap();
    assert_eq!(report.bias_analysis.bias_std, 0.0);
    assert_eq!(report.bias_analysis.bias_range, 0.0);
    assert_eq!(report.summary.overall_bias, report.bias_analysis.mean_bias);
}

#[test]
fn identical_runs_are_perfectly_consistent() {
    let range = Range::new(0.0, 100.0);
    let samples = vec![10.0, 20.0, 30.0, 40.0];
    let mut runs = RunCollection::new();
    for run in ["run_1", "run_2", "run_3"] {
        runs.extend(run, &range.key(), samples.clone());
    }
    let report = analyze(&runs, &[range]).unwrap();
    let c = report.consistency_analysis.get(&range.key()).unwrap();
    assert_eq!(c.mean_consistency, 0.0);
    assert_eq!(c.cv_mean, Some(0.0));
}

#[test]
fn analysis_is_repeatable() {
    let ranges = [Range::new(0.0, 1.0), Range::new(1.0, 100.0)];
    let mut rng = StdRng::seed_from_u64(99);
    let mut runs = RunCollection::new();
    for run in ["run_1", "run_2"] {
        for range in ranges {
            runs.extend(run, &range.key(), uniform_run(&mut rng, range, 50));
        }
    }
    let a = analyze(&runs, &ranges).unwrap();
    let b = analyze(&runs, &ranges).unwrap();
    assert_eq!(a, b);
}

#[test]
fn report_serializes_in_declaration_order() {
    let ranges = [
        Range::new(0.0, 100.0),
        Range::new(-1.0, 1.0),
        Range::new(1.0, 10.0),
    ];
    let mut runs = RunCollection::new();
    runs.extend("run_1", "1.0-10.0", [2.0, 9.0]);
    runs.extend("run_1", "-1.0-1.0", [0.5, -0.25]);
    runs.extend("run_1", "0.0-100.0", [10.0, 70.0]);
    let report = analyze(&runs, &ranges).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let first = json.find("\"0.0-100.0\"").unwrap();
    let second = json.find("\"-1.0-1.0\"").unwrap();
    let third = json.find("\"1.0-10.0\"").unwrap();
    assert!(first < second && second < third);
}
