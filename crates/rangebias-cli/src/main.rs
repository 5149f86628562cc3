//! CLI for rangebias: does your number oracle actually sample uniformly?

mod commands;
mod results;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rangebias")]
#[command(about = "rangebias: bias, uniformity and run-to-run consistency of number oracles")]
#[command(version = rangebias_core::VERSION)]
struct Cli {
    /// Raise the default log filter to debug (RUST_LOG still wins)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a results file: per-range statistics, KS and chi-square
    /// uniformity, cross-range bias and run-to-run consistency.
    Analyze {
        /// Results JSON (flat, or a saved analysis with a nested "results" object)
        path: String,

        /// Write the analysis (results + analysis + summary) as JSON
        #[arg(long)]
        output: Option<String>,

        /// Output view: summary (default, verdict-driven) or detailed (full metrics)
        #[arg(long, default_value = "summary", value_parser = ["summary", "detailed"])]
        view: String,

        /// Significance level; a test accepts uniformity when p > alpha
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Number of equal-width chi-square bins
        #[arg(long, default_value = "10")]
        bins: usize,
    },

    /// Analyze several results files and compare them range by range
    Compare {
        /// Results JSON files (two or more)
        #[arg(required = true, num_args = 2..)]
        paths: Vec<String>,

        /// Comma-separated labels, one per file (default: file stems)
        #[arg(long)]
        labels: Option<String>,

        /// Write the comparison as JSON
        #[arg(long)]
        output: Option<String>,

        /// Significance level; a test accepts uniformity when p > alpha
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Number of equal-width chi-square bins
        #[arg(long, default_value = "10")]
        bins: usize,
    },

    /// Generate a results file from a seeded synthetic oracle
    Simulate {
        /// Comma-separated ranges as lower:upper
        #[arg(
            long,
            default_value = "0:1,1:10,1:100,-1:1,0:100,-100:0,-10:10",
            allow_hyphen_values = true
        )]
        ranges: String,

        /// Samples requested per range per run
        #[arg(long, default_value = "200")]
        samples: usize,

        /// Number of independent runs
        #[arg(long, default_value = "3")]
        runs: usize,

        /// Oracle behavior
        #[arg(long, default_value = "uniform", value_parser = ["uniform", "midpoint", "lower-half", "integer"])]
        profile: String,

        /// Probability that an individual answer is lost (unparseable)
        #[arg(long, default_value = "0.0")]
        drop_rate: f64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Results JSON path
        #[arg(long, default_value = "results.json")]
        output: String,

        /// Analyze the generated results right away
        #[arg(long)]
        analyze: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Analyze {
            path,
            output,
            view,
            alpha,
            bins,
        } => commands::analyze::run(commands::analyze::AnalyzeCommandConfig {
            path: &path,
            output_path: output.as_deref(),
            view: &view,
            significance: alpha,
            chi_square_bins: bins,
        }),
        Commands::Compare {
            paths,
            labels,
            output,
            alpha,
            bins,
        } => commands::compare::run(commands::compare::CompareCommandConfig {
            paths: &paths,
            labels: labels.as_deref(),
            output_path: output.as_deref(),
            significance: alpha,
            chi_square_bins: bins,
        }),
        Commands::Simulate {
            ranges,
            samples,
            runs,
            profile,
            drop_rate,
            seed,
            output,
            analyze,
        } => commands::simulate::run(commands::simulate::SimulateCommandConfig {
            ranges: &ranges,
            samples,
            runs,
            profile: &profile,
            drop_rate,
            seed,
            output_path: &output,
            analyze,
        }),
    }
}
