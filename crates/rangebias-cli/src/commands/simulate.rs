use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rangebias_core::{Range, RunCollection, validate_ranges};

use crate::results::ResultsFile;

/// How the synthetic oracle answers "a random number between lower and upper".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimProfile {
    Uniform,
    /// Mean of three uniform draws: bell-shaped around the midpoint.
    Midpoint,
    LowerHalf,
    /// Uniform, rounded to the nearest integer inside the range.
    Integer,
}

impl SimProfile {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "uniform" => Ok(Self::Uniform),
            "midpoint" => Ok(Self::Midpoint),
            "lower-half" | "lower_half" => Ok(Self::LowerHalf),
            "integer" | "int" => Ok(Self::Integer),
            _ => Err(format!("unknown profile '{s}'")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Midpoint => "midpoint",
            Self::LowerHalf => "lower-half",
            Self::Integer => "integer",
        }
    }

    /// Draw one answer. `range` must already be validated.
    fn sample(self, rng: &mut StdRng, range: &Range) -> f64 {
        match self {
            Self::Uniform => rng.random_range(range.lower..range.upper),
            Self::Midpoint => {
                let sum: f64 = (0..3)
                    .map(|_| rng.random_range(range.lower..range.upper))
                    .sum();
                sum / 3.0
            }
            Self::LowerHalf => rng.random_range(range.lower..range.theoretical_mean()),
            Self::Integer => rng
                .random_range(range.lower..range.upper)
                .round()
                .clamp(range.lower, range.upper),
        }
    }
}

pub struct SimulateCommandConfig<'a> {
    pub ranges: &'a str,
    pub samples: usize,
    pub runs: usize,
    pub profile: &'a str,
    pub drop_rate: f64,
    pub seed: u64,
    pub output_path: &'a str,
    pub analyze: bool,
}

pub struct Simulation {
    pub ranges: Vec<Range>,
    pub samples: usize,
    pub runs: usize,
    pub profile: SimProfile,
    pub drop_rate: f64,
    pub seed: u64,
}

impl Simulation {
    /// Produce a results file; the same seed always yields the same file.
    pub fn generate(&self) -> Result<ResultsFile, String> {
        validate_ranges(&self.ranges).map_err(|e| e.to_string())?;
        if !(0.0..=1.0).contains(&self.drop_rate) {
            return Err(format!("drop rate must be in [0, 1], got {}", self.drop_rate));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut data = RunCollection::new();
        let mut dropped = 0usize;
        for run in 1..=self.runs {
            let run_id = format!("run_{run}");
            for range in &self.ranges {
                let mut answers = Vec::with_capacity(self.samples);
                for _ in 0..self.samples {
                    let value = self.profile.sample(&mut rng, range);
                    if rng.random_bool(self.drop_rate) {
                        dropped += 1;
                    } else {
                        answers.push(value);
                    }
                }
                data.extend(&run_id, &range.key(), answers);
            }
        }
        if dropped > 0 {
            log::debug!("simulated {dropped} unparseable answer(s)");
        }

        let mut results = ResultsFile::new(self.ranges.clone(), data);
        results.samples_per_range = Some(self.samples);
        results.runs = Some(self.runs);
        results.prompt_type = Some(format!("simulated-{}", self.profile.as_str()));
        Ok(results)
    }
}

pub fn run(cfg: SimulateCommandConfig<'_>) {
    let ranges = super::parse_ranges(cfg.ranges).unwrap_or_else(|e| super::fail(e));
    let profile = SimProfile::parse(cfg.profile).unwrap_or_else(|e| super::fail(e));
    let simulation = Simulation {
        ranges,
        samples: cfg.samples,
        runs: cfg.runs,
        profile,
        drop_rate: cfg.drop_rate,
        seed: cfg.seed,
    };

    println!(
        "Simulating {} run(s) x {} range(s) x {} samples (profile: {}, seed: {})...",
        simulation.runs,
        simulation.ranges.len(),
        simulation.samples,
        profile.as_str(),
        simulation.seed
    );
    let results = simulation.generate().unwrap_or_else(|e| super::fail(e));
    if let Err(e) = results.save(Path::new(cfg.output_path)) {
        super::fail(e);
    }
    println!(
        "Results written to {} ({} samples)",
        cfg.output_path,
        results.data.total_samples()
    );

    if cfg.analyze {
        println!();
        super::analyze::run(super::analyze::AnalyzeCommandConfig {
            path: cfg.output_path,
            output_path: None,
            view: "summary",
            significance: rangebias_tests::DEFAULT_SIGNIFICANCE,
            chi_square_bins: rangebias_tests::DEFAULT_BINS,
        });
    }
}
