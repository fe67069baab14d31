//! Command-line front end for the retirement simulation engine.
//!
//! Reads a JSON request from a file (or stdin with `-`), runs it through
//! [`retire_core`], and writes the JSON result to a file (or stdout).
//! Grounded on the teacher's `clap` + `color-eyre` + `tracing-subscriber`
//! combination, stripped of the TUI-specific pieces (no data directory, no
//! rolling file appender: a CLI run is one-shot and short-lived).

mod logging;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use serde::Deserialize;

use retire_core::batch::run_batch;
use retire_core::model::{BatchRequest, SimulationSnapshot};
use retire_core::scheduler::{run_simulation, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "retire_cli")]
#[command(about = "Run retirement planning simulations from a JSON snapshot")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single simulation.
    Run {
        /// Path to a JSON `SimulationRequest`, or `-` for stdin.
        #[arg(short, long)]
        input: PathBuf,
        /// Path to write the JSON `SimulationRun`; stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a batch of seeded simulations in parallel.
    Batch {
        /// Path to a JSON `BatchCliRequest`, or `-` for stdin.
        #[arg(short, long)]
        input: PathBuf,
        /// Path to write the JSON `BatchResult`; stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A single run's request body: the snapshot plus the scheduler options the
/// spec exposes as external inputs.
#[derive(Debug, Deserialize)]
struct SimulationRequest {
    snapshot: SimulationSnapshot,
    start_date: jiff::civil::Date,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    summary_only: bool,
}

/// A batch request body: the snapshot, the scenario id used for run
/// labeling, and the batch parameters.
#[derive(Debug, Deserialize)]
struct BatchCliRequest {
    snapshot: SimulationSnapshot,
    scenario_id: String,
    batch: BatchRequest,
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn write_output(output: &Option<PathBuf>, body: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, body).with_context(|| format!("writing {}", path.display())),
        None => {
            io::stdout()
                .write_all(body.as_bytes())
                .context("writing result to stdout")?;
            io::stdout().write_all(b"\n").context("writing trailing newline")
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    logging::init_logging(&args.log_level);

    match args.command {
        Command::Run { input, output } => {
            let body = read_input(&input)?;
            let request: SimulationRequest =
                serde_json::from_str(&body).context("parsing simulation request")?;

            let options = RunOptions {
                seed: request.seed,
                summary_only: request.summary_only,
            };
            let run_id = "run-0".to_string();
            let scenario_id = request.snapshot.scenario.id.0.to_string();
            let started_at = jiff::Timestamp::now();

            let run = match run_simulation(&request.snapshot, request.start_date, options) {
                Ok(result) => {
                    tracing::info!(
                        ending_balance = result.summary.ending_balance,
                        "simulation completed"
                    );
                    retire_core::model::SimulationRun::success(
                        run_id,
                        scenario_id,
                        started_at,
                        jiff::Timestamp::now(),
                        result,
                    )
                }
                Err(err) => {
                    tracing::error!(error = %err, "simulation failed");
                    retire_core::model::SimulationRun::error(
                        run_id,
                        scenario_id,
                        started_at,
                        jiff::Timestamp::now(),
                        err.to_string(),
                    )
                }
            };

            let rendered = serde_json::to_string_pretty(&run).context("serializing run result")?;
            write_output(&output, &rendered)
        }
        Command::Batch { input, output } => {
            let body = read_input(&input)?;
            let request: BatchCliRequest =
                serde_json::from_str(&body).context("parsing batch request")?;

            tracing::info!(
                scenario_id = %request.scenario_id,
                seed_count = request.batch.seeds.len(),
                "dispatching batch"
            );
            let result = run_batch(&request.snapshot, &request.scenario_id, &request.batch);
            let rendered = serde_json::to_string_pretty(&result).context("serializing batch result")?;
            write_output(&output, &rendered)
        }
    }
}
