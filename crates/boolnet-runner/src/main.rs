//! Boolean network simulator binary.
//!
//! # Usage
//!
//! ```bash
//! # Trace 1000 random initial states
//! boolnet-sim --rules rules.txt
//!
//! # Clamp inputs, fix the seed, write a JSON summary
//! boolnet-sim --rules rules.txt --clamp GF=1 --clamp TNF=0 --seed 7 --report run.json
//! ```

use std::{fs, path::PathBuf, process::ExitCode, sync::Arc};

use boolnet_core::{ClampSet, Network};
use boolnet_runner::{
    CoordinatorConfig, CsvFileSink, DEFAULT_OUTPUT, DEFAULT_SAMPLES, RunConfig, RunError,
    parse_clamp, simulate,
};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Synchronous Boolean network simulator
#[derive(Parser, Debug)]
#[command(name = "boolnet-sim")]
#[command(about = "Trace Boolean network trajectories from random initial states")]
#[command(version)]
struct Args {
    /// Rule file, one `target = expression` per line
    #[arg(short, long)]
    rules: PathBuf,

    /// Hold a node at a fixed value (NAME=0 or NAME=1), repeatable
    #[arg(short, long, value_parser = parse_clamp)]
    clamp: Vec<(String, bool)>,

    /// Number of random initial states
    #[arg(short, long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Sampling seed (drawn at random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Step bound per trajectory
    #[arg(long, default_value_t = boolnet_core::DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Transition artifact path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Optional JSON run report path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = %err, "simulation failed");
            ExitCode::FAILURE
        },
    }
}

/// Returns `Ok(false)` when the run finished but the artifact is incomplete.
fn run(args: Args) -> Result<bool, RunError> {
    let defaults = CoordinatorConfig::default();
    let config = RunConfig {
        coordinator: CoordinatorConfig {
            workers: args.workers.unwrap_or(defaults.workers),
            max_steps: args.max_steps,
        },
        samples: args.samples,
        seed: args.seed,
    };
    config.validate()?;

    let clamps: ClampSet = args.clamp.into_iter().collect();
    let text = fs::read_to_string(&args.rules)?;
    let network = Arc::new(Network::compile(&text, &clamps)?);

    tracing::info!(
        rules = %args.rules.display(),
        nodes = network.len(),
        clamped = clamps.len(),
        "network compiled"
    );

    // Created only after compilation so a bad rule file leaves no output
    let mut sink = CsvFileSink::create(&args.output)?;
    let report = simulate(network, &config, &mut sink, |progress| progress.log())?;
    report.log_summary();

    tracing::info!(output = %args.output.display(), edges = report.edges_written, "transitions written");

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|err| RunError::Io(format!("report serialization: {err}")))?;
        fs::write(path, json)?;
        tracing::info!(report = %path.display(), "run report written");
    }

    Ok(report.output_error.is_none())
}
