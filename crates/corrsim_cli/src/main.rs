//! corrsim - Command Line Runner for Correlated Monte Carlo Scenarios
//!
//! # Commands
//!
//! - `corrsim run --scenario <file>` - Accumulate paths and print percentile summaries
//! - `corrsim sample --scenario <file>` - Draw one correlated batch and report diagnostics
//! - `corrsim check --scenario <file>` - Validate a scenario without simulating it
//!
//! # Configuration
//!
//! Settings are layered: CLI flags override `CORRSIM_*` environment
//! variables, which override the scenario file, which overrides defaults.
//! `RUST_LOG` takes precedence over every log level setting.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;
mod pipeline;

pub use error::{CliError, Result};

use config::{build_config, CliArgs, LogLevel, OutputFormat};

/// Correlated Monte Carlo scenario runner
#[derive(Parser)]
#[command(name = "corrsim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every command
#[derive(Args, Debug, Clone)]
struct ScenarioArgs {
    /// Scenario file (TOML)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Number of paths
    #[arg(short, long)]
    paths: Option<usize>,

    /// Number of monthly steps
    #[arg(long)]
    steps: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output format (table, json, csv)
    #[arg(short, long)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Accumulate the path ensemble and print its percentile summary
    Run {
        #[command(flatten)]
        args: ScenarioArgs,

        /// Write trajectories to this CSV file
        #[arg(short, long)]
        trajectories: Option<PathBuf>,
    },

    /// Draw one correlated batch and report dependence diagnostics
    Sample {
        #[command(flatten)]
        args: ScenarioArgs,

        /// Write density grids to this CSV file
        #[arg(short, long)]
        densities: Option<PathBuf>,
    },

    /// Validate a scenario
    Check {
        #[command(flatten)]
        args: ScenarioArgs,
    },
}

impl Cli {
    fn scenario_args(&self) -> &ScenarioArgs {
        match &self.command {
            Commands::Run { args, .. } | Commands::Sample { args, .. } | Commands::Check { args } => {
                args
            }
        }
    }

    fn config_args(&self) -> CliArgs {
        let args = self.scenario_args();
        CliArgs {
            scenario: Some(args.scenario.clone()),
            paths: args.paths,
            steps: args.steps,
            seed: args.seed,
            format: args.format,
            log_level: if self.verbose {
                Some(LogLevel::Debug)
            } else {
                self.log_level
            },
        }
    }
}

fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cli_args = cli.config_args();

    let mut config = build_config(&cli_args).with_context(|| {
        format!(
            "failed to load scenario {}",
            cli.scenario_args().scenario.display()
        )
    })?;
    init_tracing(config.log_level);
    debug!(?cli_args, "Configuration loaded");

    match cli.command {
        Commands::Run { trajectories, .. } => {
            if trajectories.is_some() {
                config.output.trajectories = trajectories;
            }
            commands::run::run(config).context("run failed")
        }
        Commands::Sample { densities, .. } => {
            if densities.is_some() {
                config.output.densities = densities;
            }
            commands::sample::run(config).context("sample failed")
        }
        Commands::Check { .. } => commands::check::run(config).context("scenario check failed"),
    }
}
