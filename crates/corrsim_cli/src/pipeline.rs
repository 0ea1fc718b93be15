//! Scenario pipeline
//!
//! Turns a validated [`ScenarioConfig`] into engine inputs and runs them:
//! correlation structure, growth and contribution sources, accumulation and
//! summary. Column-driven contributions are sampled one step at a time from
//! the copula, so only a single month of daily draws is held in memory.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use corrsim_core::correlation::CorrelationStructure;
use corrsim_core::types::{month_windows, parse_date, period_dates, DomainError};
use corrsim_engine::accumulate::{
    AccumulationConfig, Accumulator, ContributionSpec, GrowthSpec, PathEnsemble,
};
use corrsim_engine::aggregate::{reduce_along_time, Reduction, Window};
use corrsim_engine::batch::TimeBatch;
use corrsim_engine::copula::{sample_uniform, CopulaSampler};
use corrsim_engine::diagnostics::{
    density_grid, ks_critical_value, ks_statistic_uniform, pearson_matrix, spearman_matrix,
    zero_fraction,
};
use corrsim_engine::rng::SimRng;
use corrsim_engine::summary::{summarize, DiscountConfig, SummaryTable};
use corrsim_engine::transform::{transform, transform_time_batch, ColumnSpec};
use corrsim_models::marginals::{Marginal, MarginalSpec};

use crate::config::{
    AggregationWindow, ContributionSection, CorrelationSection, GrowthSection, ScenarioConfig,
};
use crate::{CliError, Result};

/// Significance level of the uniformity checks in sample reports.
pub const KS_ALPHA: f64 = 0.05;

/// Tail probability trimmed from each side of a density grid.
const DENSITY_TAIL: f64 = 1e-3;

/// A scenario ready to run.
#[derive(Debug)]
pub struct Scenario {
    config: ScenarioConfig,
    structure: CorrelationStructure,
    start: NaiveDate,
}

/// Result of one scenario run.
#[derive(Debug)]
pub struct ScenarioRun {
    pub ensemble: PathEnsemble,
    pub summary: SummaryTable,
    pub dates: Vec<NaiveDate>,
}

/// Per-column statistics of a sampled batch.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnReport {
    pub column: usize,
    pub kind: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Fraction of exact zeros, gated columns only
    pub zero_fraction: Option<f64>,
}

/// Dependence and marginal diagnostics of one sampled batch.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub paths: usize,
    pub dimension: usize,
    /// Target correlation matrix, row-major
    pub target: Vec<f64>,
    /// Spearman rank correlation of the uniforms, row-major
    pub spearman: Vec<f64>,
    /// Pearson correlation of the transformed columns, row-major
    pub pearson: Vec<f64>,
    /// KS statistic per uniform coordinate
    pub ks_statistics: Vec<f64>,
    pub ks_critical_value: f64,
    pub columns: Vec<ColumnReport>,
}

impl SampleReport {
    /// Coordinates whose KS statistic exceeds the critical value
    pub fn rejected_coordinates(&self) -> Vec<usize> {
        self.ks_statistics
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > self.ks_critical_value)
            .map(|(j, _)| j)
            .collect()
    }
}

/// Builds the correlation structure; empty entries give the identity.
///
/// Singular matrices are accepted as-is; the core builder already logs them.
pub fn build_structure(section: &CorrelationSection) -> Result<CorrelationStructure> {
    let structure = if section.entries.is_empty() {
        CorrelationStructure::identity(section.dimension)?
    } else {
        CorrelationStructure::build(section.dimension, &section.entries)?
    };
    Ok(structure)
}

/// Maps the growth section onto the engine's growth source.
pub fn build_growth(section: &GrowthSection) -> GrowthSpec {
    match section {
        GrowthSection::Deterministic {
            annual_rate,
            periods_per_year,
        } => GrowthSpec::Deterministic {
            annual_rate: *annual_rate,
            periods_per_year: *periods_per_year,
        },
        GrowthSection::Stochastic {
            log_returns,
            days_per_period,
            drift_scaling,
        } => GrowthSpec::Stochastic {
            log_returns: log_returns.clone(),
            days_per_period: *days_per_period,
            drift_scaling: *drift_scaling,
        },
    }
}

impl Scenario {
    /// Prepares a scenario; the config is validated again here.
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        let start = parse_date(&config.simulation.start_date)?;
        let structure = build_structure(&config.correlation)?;
        Ok(Self {
            config,
            structure,
            start,
        })
    }

    /// The scenario configuration
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// The correlation structure
    pub fn structure(&self) -> &CorrelationStructure {
        &self.structure
    }

    /// Generator seeded from the scenario, or from entropy
    pub fn rng(&self) -> SimRng {
        self.config
            .simulation
            .seed
            .map_or_else(SimRng::from_entropy, SimRng::from_seed)
    }

    /// Dates labelling each step
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(period_dates(self.start, self.config.simulation.steps)?)
    }

    fn column(&self, index: usize) -> Result<&ColumnSpec> {
        self.config.columns.get(index).ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "column {} does not exist ({} configured)",
                index,
                self.config.columns.len()
            ))
        })
    }

    /// Draw counts per step for a column contribution
    fn window_lengths(&self, window: AggregationWindow) -> Result<Vec<usize>> {
        let steps = self.config.simulation.steps;
        match window {
            AggregationWindow::Calendar => Ok(month_windows(self.start, steps)?),
            AggregationWindow::Fixed(n) => Ok(vec![n; steps]),
        }
    }

    /// Per-step sums of one transformed column, scaled.
    ///
    /// Each step draws `lengths[t]` correlated rows for every path, so the
    /// column's dependence on the other coordinates holds at the daily level.
    pub fn column_contributions(
        &self,
        column: usize,
        window: AggregationWindow,
        scale: f64,
        rng: &mut SimRng,
    ) -> Result<TimeBatch> {
        let spec = self.column(column)?;
        let lengths = self.window_lengths(window)?;
        let paths = self.config.simulation.paths;
        let sampler = CopulaSampler::new(&self.structure);

        debug!(
            column,
            steps = lengths.len(),
            draws = lengths.iter().sum::<usize>(),
            "Sampling column contributions"
        );

        let mut totals = TimeBatch::zeros(lengths.len(), paths);
        for (t, &len) in lengths.iter().enumerate() {
            let uniforms = sampler.sample_time_batch(len, paths, rng);
            let values = transform_time_batch(&uniforms, std::slice::from_ref(spec))?.column(0)?;
            let total = reduce_along_time(&values, &Window::Fixed(len), Reduction::Sum)?;
            for (dst, &src) in totals.row_mut(t).iter_mut().zip(total.row(0)) {
                *dst = scale * src;
            }
        }
        Ok(totals)
    }

    /// Maps the contribution section onto the engine's contribution source.
    pub fn build_contribution(&self, rng: &mut SimRng) -> Result<ContributionSpec> {
        Ok(match &self.config.contribution {
            ContributionSection::None => ContributionSpec::None,
            ContributionSection::LumpSum { amount } => ContributionSpec::LumpSum { amount: *amount },
            ContributionSection::Recurring { amount } => {
                ContributionSpec::Recurring { amount: *amount }
            }
            ContributionSection::Column {
                column,
                window,
                scale,
            } => ContributionSpec::Precomputed {
                amounts: self.column_contributions(*column, *window, *scale, rng)?,
            },
        })
    }

    /// Discounting for the summary, if any rate is configured
    pub fn discount(&self) -> Result<Option<DiscountConfig>> {
        let summary = &self.config.summary;
        if !summary.discounting() {
            return Ok(None);
        }
        let config = DiscountConfig::new(
            summary.discount_rate.unwrap_or(0.0),
            summary.inflation_rate.unwrap_or(0.0),
            summary.periods_per_year,
        )?;
        Ok(Some(config.with_timing(summary.discount_timing)))
    }

    /// Accumulates the ensemble and summarises it.
    pub fn run(&self) -> Result<ScenarioRun> {
        let sim = &self.config.simulation;
        let mut rng = self.rng();
        info!(
            paths = sim.paths,
            steps = sim.steps,
            seed = rng.seed(),
            "Running scenario"
        );

        let contribution = self.build_contribution(&mut rng)?;
        let mut builder = AccumulationConfig::builder()
            .time_steps(sim.steps)
            .path_count(sim.paths)
            .growth(build_growth(&self.config.growth))
            .contribution(contribution);
        if let Some(seed) = sim.seed {
            builder = builder.seed(seed);
        }
        let accumulation = builder.build()?;

        let ensemble = Accumulator::with_rng(accumulation, rng).run()?;
        let discount = self.discount()?;
        let summary = summarize(&ensemble, &self.config.summary.levels, discount.as_ref())?;
        info!(terminal_mean = summary.terminal_mean, "Scenario complete");

        Ok(ScenarioRun {
            ensemble,
            summary,
            dates: self.dates()?,
        })
    }

    /// Draws one batch of correlated rows and reports dependence diagnostics.
    pub fn sample(&self) -> Result<SampleReport> {
        let paths = self.config.simulation.paths;
        let dimension = self.structure.dim();
        let mut rng = self.rng();

        let uniforms = sample_uniform(&self.structure, paths, &mut rng);
        let ks_statistics = (0..dimension)
            .map(|j| ks_statistic_uniform(&uniforms.column(j)?))
            .collect::<std::result::Result<Vec<_>, DomainError>>()?;
        let spearman = spearman_matrix(&uniforms)?;

        let (pearson, columns) = if self.config.columns.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let transformed = transform(&uniforms, &self.config.columns)?;
            let columns = self
                .config
                .columns
                .iter()
                .enumerate()
                .map(|(index, spec)| {
                    let values = transformed.column(index)?;
                    Ok(column_report(index, spec, &values))
                })
                .collect::<Result<Vec<_>>>()?;
            (pearson_matrix(&transformed)?, columns)
        };

        Ok(SampleReport {
            paths,
            dimension,
            target: self.structure.as_slice().to_vec(),
            spearman,
            pearson,
            ks_statistics,
            ks_critical_value: ks_critical_value(paths, KS_ALPHA),
            columns,
        })
    }

    /// Density grids of every continuous column and every gated magnitude.
    pub fn density_grids(&self) -> Result<Vec<(usize, Vec<(f64, f64)>)>> {
        let points = self.config.output.density_points;
        self.config
            .columns
            .iter()
            .enumerate()
            .filter_map(|(index, spec)| {
                let marginal: &MarginalSpec = match spec {
                    ColumnSpec::Continuous { marginal, .. } => marginal,
                    ColumnSpec::Gated { spec, .. } => spec.magnitude(),
                    ColumnSpec::Passthrough { .. } => return None,
                };
                Some(grid_between_tails(marginal, points).map(|grid| (index, grid)))
            })
            .collect()
    }
}

fn grid_between_tails(marginal: &MarginalSpec, points: usize) -> Result<Vec<(f64, f64)>> {
    let lo = marginal.quantile(DENSITY_TAIL)?;
    let hi = marginal.quantile(1.0 - DENSITY_TAIL)?;
    Ok(density_grid(marginal, lo, hi, points))
}

fn column_report(index: usize, spec: &ColumnSpec, values: &[f64]) -> ColumnReport {
    let n = values.len().max(1) as f64;
    let (kind, zeros) = match spec {
        ColumnSpec::Continuous { marginal, .. } => (marginal.kind_name().to_string(), None),
        ColumnSpec::Gated { spec, .. } => (
            format!("gated {}", spec.magnitude().kind_name()),
            Some(zero_fraction(values)),
        ),
        ColumnSpec::Passthrough { .. } => ("passthrough".to_string(), None),
    };
    ColumnReport {
        column: index,
        kind,
        mean: values.iter().sum::<f64>() / n,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        zero_fraction: zeros,
    }
}
