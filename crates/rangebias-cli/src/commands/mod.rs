pub mod analyze;
pub mod compare;
pub mod simulate;

use rangebias_core::Range;

/// Print `Error: {msg}` and exit with status 1.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1)
}

/// Parse `"lower:upper,lower:upper,..."` into ranges, in order.
pub fn parse_ranges(s: &str) -> Result<Vec<Range>, String> {
    let mut ranges = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lower, upper) = part
            .split_once(':')
            .ok_or_else(|| format!("range '{part}' is not lower:upper"))?;
        let lower: f64 = lower
            .trim()
            .parse()
            .map_err(|e| format!("bad lower bound in '{part}': {e}"))?;
        let upper: f64 = upper
            .trim()
            .parse()
            .map_err(|e| format!("bad upper bound in '{part}': {e}"))?;
        ranges.push(Range::new(lower, upper));
    }
    if ranges.is_empty() {
        return Err("no ranges given".to_string());
    }
    Ok(ranges)
}
