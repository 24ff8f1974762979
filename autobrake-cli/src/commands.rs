use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::BufReader;
use tracing::{info, warn};

use autobrake_config::AutobrakeConfig;
use autobrake_engine::{AutobrakeRuntime, RunReport};
use autobrake_simulator::{Scenario, Simulator};
use autobrake_telemetry::EventLogger;

#[derive(Parser, Debug)]
#[command(name = "autobrake", version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/autobrake.yaml plus AUTOBRAKE_* overrides
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a deterministic simulation
    Simulate(SimulateArgs),
    /// Replay a recorded scenario file
    Replay(ReplayArgs),
    /// Read JSON sensor events, one per line, from a file or stdin
    Run(RunArgs),
    /// Load and validate the configuration, then print it
    CheckConfig,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Number of ticks to simulate (overrides simulator.event_count)
    #[arg(long)]
    pub events: Option<usize>,
    /// Seed for the simulator (overrides simulator.seed)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Collision threshold in seconds
    #[arg(long)]
    pub threshold: Option<f64>,
    /// Save the generated readings as a scenario file
    #[arg(long)]
    pub record: Option<PathBuf>,
    #[arg(long)]
    pub validate_hash: Option<String>,
    /// Print Prometheus metrics when done
    #[arg(long)]
    pub print_metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(short, long)]
    pub scenario: PathBuf,
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long)]
    pub validate_hash: Option<String>,
    #[arg(long)]
    pub print_metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Input file; stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Abort on the first malformed line instead of skipping it
    #[arg(long)]
    pub strict: bool,
    #[arg(long)]
    pub print_metrics: bool,
    #[arg(long)]
    pub threshold: Option<f64>,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AutobrakeConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AutobrakeConfig::load()?,
    };

    if let Err(e) = EventLogger::init(&config.telemetry.log_level, config.telemetry.json_logs) {
        eprintln!("Logging disabled: {e}");
    }

    match cli.command {
        Commands::Simulate(args) => simulate(config, args),
        Commands::Replay(args) => replay(config, args),
        Commands::Run(args) => run_live(config, args).await,
        Commands::CheckConfig => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn simulate(mut config: AutobrakeConfig, args: SimulateArgs) -> anyhow::Result<()> {
    if let Some(seed) = args.seed {
        config.simulator.seed = seed;
    }
    apply_threshold(&mut config, args.threshold);
    let event_count = args.events.unwrap_or(config.simulator.event_count);

    if let Some(path) = &args.record {
        let scenario = Simulator::new(config.simulator.clone()).record(event_count);
        scenario
            .save_to_file(path)
            .with_context(|| format!("saving scenario to {}", path.display()))?;
        info!(
            "Recorded {} readings to {}",
            scenario.len(),
            path.display()
        );
    }

    let runtime = AutobrakeRuntime::new(config)?;
    let report = runtime.run_simulation(event_count)?;
    finish(&runtime, &report, args.validate_hash.as_deref(), args.print_metrics)
}

fn replay(mut config: AutobrakeConfig, args: ReplayArgs) -> anyhow::Result<()> {
    apply_threshold(&mut config, args.threshold);
    let scenario = Scenario::load_from_file(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;

    let runtime = AutobrakeRuntime::new(config)?;
    let report = runtime.run_replay(scenario)?;
    finish(&runtime, &report, args.validate_hash.as_deref(), args.print_metrics)
}

async fn run_live(mut config: AutobrakeConfig, args: RunArgs) -> anyhow::Result<()> {
    apply_threshold(&mut config, args.threshold);
    let runtime = AutobrakeRuntime::new(config)?;

    let report = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            runtime.run_live(BufReader::new(file), args.strict).await?
        }
        None => {
            runtime
                .run_live(BufReader::new(tokio::io::stdin()), args.strict)
                .await?
        }
    };
    finish(&runtime, &report, None, args.print_metrics)
}

fn apply_threshold(config: &mut AutobrakeConfig, threshold: Option<f64>) {
    if let Some(threshold) = threshold {
        config.controller.collision_threshold_s = threshold;
    }
}

fn finish(
    runtime: &AutobrakeRuntime,
    report: &RunReport,
    validate_hash: Option<&str>,
    print_metrics: bool,
) -> anyhow::Result<()> {
    println!(
        "events: {}  brakes: {}  min ttc: {}  hash: {}",
        report.events_dispatched,
        report.brake_commands,
        report
            .min_time_to_collision_s
            .map(|ttc| format!("{ttc:.3}s"))
            .unwrap_or_else(|| "-".to_string()),
        report.state_hash
    );

    if print_metrics {
        match runtime.metrics() {
            Some(metrics) => print!("{}", metrics.gather_metrics()?),
            None => warn!("Metrics are disabled in the configuration"),
        }
    }

    if let Some(expected) = validate_hash {
        runtime.validate_hash(report, expected)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simulate_flags() {
        let cli = Cli::parse_from([
            "autobrake",
            "--config",
            "cfg.yaml",
            "simulate",
            "--events",
            "50",
            "--seed",
            "7",
            "--threshold",
            "2.5",
            "--print-metrics",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.yaml")));
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.events, Some(50));
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.threshold, Some(2.5));
                assert!(args.print_metrics);
                assert!(args.record.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn replay_requires_scenario() {
        assert!(Cli::try_parse_from(["autobrake", "replay"]).is_err());
    }

    #[test]
    fn run_defaults_to_stdin() {
        let cli = Cli::parse_from(["autobrake", "run", "--strict"]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.input.is_none());
                assert!(args.strict);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn check_config_subcommand() {
        let cli = Cli::parse_from(["autobrake", "check-config"]);
        assert!(matches!(cli.command, Commands::CheckConfig));
    }
}
