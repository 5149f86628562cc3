//! Declared sampling ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// A declared `(lower, upper)` interval the oracle is asked to sample within.
///
/// Serializes as a two-element array `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

impl Range {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Identity key, `"{lower}-{upper}"`, e.g. `0.0-1.0` or `-1.0-1.0`.
    ///
    /// Bounds render as the shortest round-trip decimal with a trailing `.0`
    /// for integral values; very small or large bounds use an exponent with
    /// an explicit sign and at least two digits (`1e-05`, `1e+16`), which is
    /// how results files written by Python generators spell them.
    pub fn key(&self) -> String {
        format!("{}-{}", render_bound(self.lower), render_bound(self.upper))
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Mean of Uniform(lower, upper).
    pub fn theoretical_mean(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Standard deviation of Uniform(lower, upper): `width / sqrt(12)`.
    pub fn theoretical_std(&self) -> f64 {
        self.width() / 12.0_f64.sqrt()
    }

    /// Reject ranges that cannot be normalized onto `[0, 1]`.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let finite = self.lower.is_finite() && self.upper.is_finite();
        if finite && self.upper > self.lower && self.width().is_finite() {
            Ok(())
        } else {
            Err(AnalysisError::Domain {
                range: self.key(),
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    /// Map `x` onto the unit interval. Caller must have validated the range.
    pub fn normalize(&self, x: f64) -> f64 {
        (x - self.lower) / self.width()
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.lower..=self.upper).contains(&x)
    }
}

/// `{:?}` already switches to an exponent below 1e-4 and from 1e16 on;
/// only the exponent spelling differs (`1e-5` vs `1e-05`, `1e16` vs `1e+16`).
fn render_bound(x: f64) -> String {
    let debug = format!("{x:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

impl From<(f64, f64)> for Range {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self { lower, upper }
    }
}

impl From<Range> for (f64, f64) {
    fn from(r: Range) -> Self {
        (r.lower, r.upper)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Validate every declared range and reject duplicate keys.
pub fn validate_ranges(ranges: &[Range]) -> Result<(), AnalysisError> {
    for (i, range) in ranges.iter().enumerate() {
        range.validate()?;
        let key = range.key();
        if ranges[..i].iter().any(|r| r.key() == key) {
            return Err(AnalysisError::DuplicateRange { range: key });
        }
    }
    Ok(())
}
