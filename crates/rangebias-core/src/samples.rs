//! Raw sample input: per-run, per-range sample sets.
//!
//! A [`RunCollection`] maps run identifiers (in run order) to the samples
//! each run produced for each range key. Sample sets may be empty or missing
//! entirely when the generator lost samples to transient failures.

use serde::{Deserialize, Serialize};

use crate::map::OrderedMap;

/// Samples attributed to one (range, run) pair.
pub type SampleSet = Vec<f64>;

/// Everything the generator produced: run id → range key → samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunCollection {
    runs: OrderedMap<OrderedMap<SampleSet>>,
}

impl RunCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append samples for `range_key` to run `run_id`, creating either as needed.
    pub fn extend(&mut self, run_id: &str, range_key: &str, samples: impl IntoIterator<Item = f64>) {
        self.runs
            .entry_or_default(run_id)
            .entry_or_default(range_key)
            .extend(samples);
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn runs(&self) -> impl Iterator<Item = (&str, &OrderedMap<SampleSet>)> {
        self.runs.iter()
    }

    pub fn run(&self, run_id: &str) -> Option<&OrderedMap<SampleSet>> {
        self.runs.get(run_id)
    }

    /// Union of every run's samples for `range_key`, in run order.
    pub fn pooled(&self, range_key: &str) -> SampleSet {
        self.runs
            .values()
            .filter_map(|run| run.get(range_key))
            .flat_map(|samples| samples.iter().copied())
            .collect()
    }

    /// Runs that produced a non-empty sample set for `range_key`.
    pub fn qualifying_runs<'a>(
        &'a self,
        range_key: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [f64])> + 'a {
        self.runs.iter().filter_map(move |(run_id, run)| {
            run.get(range_key)
                .filter(|samples| !samples.is_empty())
                .map(|samples| (run_id, samples.as_slice()))
        })
    }

    /// Total number of samples across all runs and ranges.
    pub fn total_samples(&self) -> usize {
        self.runs
            .values()
            .flat_map(|run| run.values())
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> RunCollection {
        let mut runs = RunCollection::new();
        runs.extend("run_1", "0.0-1.0", [0.1, 0.2]);
        runs.extend("run_1", "1.0-10.0", [5.0]);
        runs.extend("run_2", "0.0-1.0", Vec::new());
        runs.extend("run_3", "0.0-1.0", [0.9]);
        runs
    }

    #[test]
    fn test_pooled_follows_run_order() {
        let runs = collection();
        assert_eq!(runs.pooled("0.0-1.0"), vec![0.1, 0.2, 0.9]);
        assert_eq!(runs.pooled("1.0-10.0"), vec![5.0]);
        assert!(runs.pooled("missing").is_empty());
    }

    #[test]
    fn test_qualifying_runs_skip_empty() {
        let runs = collection();
        let ids: Vec<_> = runs.qualifying_runs("0.0-1.0").map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["run_1", "run_3"]);
    }

    #[test]
    fn test_counts() {
        let runs = collection();
        assert_eq!(runs.run_count(), 3);
        assert_eq!(runs.total_samples(), 4);
    }

    #[test]
    fn test_json_shape() {
        let mut runs = RunCollection::new();
        runs.extend("run_1", "0.0-1.0", [0.5]);
        let json = serde_json::to_string(&runs).unwrap();
        assert_eq!(json, r#"{"run_1":{"0.0-1.0":[0.5]}}"#);
        let back: RunCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, runs);
    }
}
