//! # rangebias-core
//!
//! **Does your number oracle actually sample uniformly?**
//!
//! Ask a language model (or any other oracle) for "a random number between
//! 1 and 100" a few hundred times, over several runs, and hand the answers to
//! [`analyze`]. You get back per-range descriptive statistics against the
//! uniform null, a Kolmogorov-Smirnov and a ten-bin chi-square verdict,
//! cross-range bias figures, and run-to-run consistency metrics.
//!
//! ## Quick Start
//!
//! ```
//! use rangebias_core::{Range, RunCollection, analyze};
//!
//! let ranges = [Range::new(0.0, 1.0)];
//! let mut runs = RunCollection::new();
//! runs.extend("run_1", "0.0-1.0", [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]);
//! runs.extend("run_2", "0.0-1.0", [0.15, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.85, 0.95]);
//!
//! let report = analyze(&runs, &ranges).unwrap();
//! let unit = report.range_analysis.get("0.0-1.0").unwrap();
//! assert!((unit.statistics.mean_bias - 0.025).abs() < 1e-9);
//! ```
//!
//! ## Architecture
//!
//! RunCollection → pool per range → RangeStatistics + UniformityVerdict →
//! BiasSummary, ConsistencyReport → Summary
//!
//! The engine does no I/O and keeps no state between calls. Sample
//! generation, plotting and persistence live outside this crate.

pub mod analyzer;
pub mod bias;
pub mod consistency;
pub mod error;
pub mod map;
pub mod range;
pub mod report;
pub mod samples;
pub mod stats;
pub mod uniformity;

pub use analyzer::{AnalysisConfig, Analyzer, analyze};
pub use bias::BiasSummary;
pub use consistency::{
    ConsistencyReport, analyze_consistency, cancellation_tolerance, coefficient_of_variation,
};
pub use error::AnalysisError;
pub use map::OrderedMap;
pub use range::{Range, validate_ranges};
pub use report::{AnalysisReport, RangeReport, Summary, UniformityFindings};
pub use samples::{RunCollection, SampleSet};
pub use stats::{RangeStatistics, SampleSummary, percentile, run_statistics};
pub use uniformity::{UniformityVerdict, normalize, test_uniformity};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
