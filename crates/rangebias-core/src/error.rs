//! Engine error type.
//!
//! Only structural violations are errors. Sparse data (a range with no
//! samples in some or all runs, a coefficient of variation with a zero
//! denominator) is recorded in the report instead.

use thiserror::Error;

/// Errors surfaced by [`crate::analyze`] and the components it drives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// No declared range produced a single usable sample across all runs.
    #[error("no usable samples for any declared range; nothing to aggregate")]
    EmptyInput,

    /// A declared range has non-positive width or a non-finite bound, so
    /// samples cannot be mapped onto the unit interval.
    #[error("range {range} is invalid: lower {lower} must be finite and strictly below upper {upper}")]
    Domain {
        /// Range key as rendered by [`crate::Range::key`]
        range: String,
        lower: f64,
        upper: f64,
    },

    /// Two declared ranges render to the same key.
    #[error("range {range} is declared more than once")]
    DuplicateRange { range: String },

    /// A single-range computation was handed an empty sample set.
    #[error("range {range} has no samples")]
    NoSamples { range: String },

    /// Analysis configuration is out of bounds.
    #[error("invalid analysis configuration: {reason}")]
    InvalidConfig { reason: String },
}
