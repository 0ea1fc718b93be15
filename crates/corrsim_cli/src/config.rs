//! Scenario configuration management
//!
//! Loads a scenario from a TOML file, then applies environment variables and
//! CLI flags on top.
//!
//! ```toml
//! log_level = "info"
//!
//! [simulation]
//! paths = 10000
//! steps = 240
//! seed = 42
//! start_date = "2024-01-01"
//!
//! [correlation]
//! dimension = 2
//! entries = [1.0, 0.4, 0.4, 1.0]
//!
//! [[columns]]
//! type = "gated"
//! gate = 0
//! magnitude = 1
//! [columns.spec]
//! no_event_probability = 0.9
//! [columns.spec.magnitude]
//! kind = "pert"
//! minimum = 20.0
//! mode = 20.0
//! maximum = 1500.0
//!
//! [growth]
//! mode = "deterministic"
//! annual_rate = 0.08
//!
//! [contribution]
//! mode = "column"
//! column = 0
//! window = "calendar"
//! scale = -1.0
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use corrsim_core::types::parse_date;
use corrsim_engine::accumulate::{MAX_PATHS, MAX_STEPS};
use corrsim_engine::summary::DiscountTiming;
use corrsim_engine::transform::ColumnSpec;
use corrsim_models::marginals::{DriftScaling, MarginalSpec};

/// Environment variable overriding the path count.
pub const ENV_PATHS: &str = "CORRSIM_PATHS";
/// Environment variable overriding the step count.
pub const ENV_STEPS: &str = "CORRSIM_STEPS";
/// Environment variable overriding the seed.
pub const ENV_SEED: &str = "CORRSIM_SEED";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "CORRSIM_LOG_LEVEL";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid output format: {0}. Must be one of: table, json, csv")]
    InvalidFormat(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),

    #[error("Invalid scenario:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Output formats for summaries and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

/// `[simulation]`: ensemble size, seed and calendar start
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Number of paths
    pub paths: usize,
    /// Number of monthly steps
    pub steps: usize,
    /// Seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// First day of the simulation (YYYY-MM-DD)
    pub start_date: String,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            paths: 10_000,
            steps: 240,
            seed: None,
            start_date: "2024-01-01".to_string(),
        }
    }
}

/// `[correlation]`: target correlation matrix
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorrelationSection {
    /// Matrix dimension
    pub dimension: usize,
    /// Row-major entries; empty means the identity
    pub entries: Vec<f64>,
}

impl Default for CorrelationSection {
    fn default() -> Self {
        Self {
            dimension: 1,
            entries: Vec::new(),
        }
    }
}

fn default_periods_per_year() -> u32 {
    12
}

/// `[growth]`: per-step growth factor source
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GrowthSection {
    Deterministic {
        annual_rate: f64,
        #[serde(default = "default_periods_per_year")]
        periods_per_year: u32,
    },
    Stochastic {
        log_returns: MarginalSpec,
        days_per_period: f64,
        #[serde(default)]
        drift_scaling: DriftScaling,
    },
}

impl Default for GrowthSection {
    fn default() -> Self {
        GrowthSection::Deterministic {
            annual_rate: 0.08,
            periods_per_year: 12,
        }
    }
}

/// How sub-steps of a column contribution are grouped into one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationWindow {
    /// One draw per calendar day of each month
    #[default]
    Calendar,
    /// A fixed number of draws per step
    Fixed(usize),
}

fn default_scale() -> f64 {
    1.0
}

/// `[contribution]`: per-step contribution source
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ContributionSection {
    #[default]
    None,
    LumpSum {
        amount: f64,
    },
    Recurring {
        amount: f64,
    },
    /// Sum of a transformed column's draws over each step's window
    Column {
        column: usize,
        #[serde(default)]
        window: AggregationWindow,
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

/// `[summary]`: percentile levels and present-value rates
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarySection {
    /// Percentile levels in percent
    pub levels: Vec<f64>,
    /// Annual discount rate
    pub discount_rate: Option<f64>,
    /// Annual inflation rate
    pub inflation_rate: Option<f64>,
    /// Steps per year, for rate conversion
    pub periods_per_year: u32,
    /// Whether step `t` is discounted over `t` or `t + 1` periods
    pub discount_timing: DiscountTiming,
}

impl Default for SummarySection {
    fn default() -> Self {
        Self {
            levels: vec![5.0, 25.0, 50.0, 75.0, 95.0],
            discount_rate: None,
            inflation_rate: None,
            periods_per_year: 12,
            discount_timing: DiscountTiming::StartOfPeriod,
        }
    }
}

impl SummarySection {
    /// Whether present values are requested
    pub fn discounting(&self) -> bool {
        self.discount_rate.is_some() || self.inflation_rate.is_some()
    }
}

/// `[output]`: format and optional file exports
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    #[serde(deserialize_with = "deserialize_from_str")]
    pub format: OutputFormat,
    /// Long-format trajectory CSV (`date,simulation,value`)
    pub trajectories: Option<PathBuf>,
    /// Number of trajectories exported
    pub trajectory_paths: usize,
    /// Density grid CSV for each continuous column (`sample` command)
    pub densities: Option<PathBuf>,
    /// Points per density grid
    pub density_points: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            trajectories: None,
            trajectory_paths: 100,
            densities: None,
            density_points: 250,
        }
    }
}

/// Complete scenario
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: LogLevel,
    pub simulation: SimulationSection,
    pub correlation: CorrelationSection,
    /// One output column per entry
    pub columns: Vec<ColumnSpec>,
    pub growth: GrowthSection,
    pub contribution: ContributionSection,
    pub summary: SummarySection,
    pub output: OutputSection,
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply `CORRSIM_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("{}={} is not valid", name, value)))
        }

        if let Some(paths) = lookup(ENV_PATHS) {
            self.simulation.paths = parse(ENV_PATHS, &paths)?;
        }
        if let Some(steps) = lookup(ENV_STEPS) {
            self.simulation.steps = parse(ENV_STEPS, &steps)?;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            self.simulation.seed = Some(parse(ENV_SEED, &seed)?);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        Ok(())
    }

    /// Apply `CORRSIM_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(paths) = cli.paths {
            self.simulation.paths = paths;
        }
        if let Some(steps) = cli.steps {
            self.simulation.steps = steps;
        }
        if let Some(seed) = cli.seed {
            self.simulation.seed = Some(seed);
        }
        if let Some(format) = cli.format {
            self.output.format = format;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
    }

    /// Validate the scenario, collecting every problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        let sim = &self.simulation;
        if sim.paths == 0 || sim.paths > MAX_PATHS {
            problems.push(format!("simulation.paths must be in [1, {}], got {}", MAX_PATHS, sim.paths));
        }
        if sim.steps == 0 || sim.steps > MAX_STEPS {
            problems.push(format!("simulation.steps must be in [1, {}], got {}", MAX_STEPS, sim.steps));
        }
        if let Err(e) = parse_date(&sim.start_date) {
            problems.push(format!("simulation.start_date: {}", e));
        }

        let dim = self.correlation.dimension;
        if dim == 0 {
            problems.push("correlation.dimension must be at least 1".to_string());
        }
        let entries = self.correlation.entries.len();
        if entries != 0 && entries != dim * dim {
            problems.push(format!(
                "correlation.entries must hold {} values for dimension {}, got {}",
                dim * dim,
                dim,
                entries
            ));
        }

        for (i, column) in self.columns.iter().enumerate() {
            if let Err(e) = column.validate(dim) {
                problems.push(format!("columns[{}]: {}", i, e));
            }
        }

        if let GrowthSection::Stochastic {
            days_per_period, ..
        } = &self.growth
        {
            if !(days_per_period.is_finite() && *days_per_period > 0.0) {
                problems.push(format!(
                    "growth.days_per_period must be positive, got {}",
                    days_per_period
                ));
            }
        }

        match &self.contribution {
            ContributionSection::Column { column, window, .. } => {
                if *column >= self.columns.len() {
                    problems.push(format!(
                        "contribution.column {} does not name one of the {} columns",
                        column,
                        self.columns.len()
                    ));
                }
                if *window == AggregationWindow::Fixed(0) {
                    problems.push("contribution.window must be at least 1 draw".to_string());
                }
            }
            ContributionSection::LumpSum { amount } | ContributionSection::Recurring { amount } => {
                if !amount.is_finite() {
                    problems.push(format!("contribution.amount must be finite, got {}", amount));
                }
            }
            ContributionSection::None => {}
        }

        let summary = &self.summary;
        if summary.levels.is_empty() {
            problems.push("summary.levels must not be empty".to_string());
        }
        for level in &summary.levels {
            if !(0.0..=100.0).contains(level) {
                problems.push(format!("summary.levels: {} is outside [0, 100]", level));
            }
        }
        for (name, rate) in [
            ("discount_rate", summary.discount_rate),
            ("inflation_rate", summary.inflation_rate),
        ] {
            if let Some(rate) = rate {
                if !(rate.is_finite() && rate > -1.0) {
                    problems.push(format!("summary.{} must be greater than -1, got {}", name, rate));
                }
            }
        }
        if summary.periods_per_year == 0 {
            problems.push("summary.periods_per_year must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Scenario file path
    pub scenario: Option<PathBuf>,
    /// Path count override
    pub paths: Option<usize>,
    /// Step count override
    pub steps: Option<usize>,
    /// Seed override
    pub seed: Option<u64>,
    /// Output format override
    pub format: Option<OutputFormat>,
    /// Log level override
    pub log_level: Option<LogLevel>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Scenario file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ScenarioConfig, ConfigError> {
    let mut config = match &cli.scenario {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::default(),
    };

    config.apply_env()?;
    config.merge_with_cli(cli);
    config.validate()?;

    Ok(config)
}
