//! Path accumulator: fills growth and contributions, then steps through time.

use tracing::{debug, trace};

use corrsim_core::types::{DomainError, SimulationError};
use corrsim_models::marginals::MarginalSpec;

use super::config::AccumulationConfig;
use super::ensemble::PathEnsemble;
use super::modes::{ContributionSpec, GrowthSpec};
use super::stepper::advance_step;
use super::workspace::AccumulationWorkspace;
use crate::parallel::fill_rows_seeded;
use crate::rng::SimRng;
use crate::transform::sample_marginal;

/// Advances an ensemble of paths through the configured time steps.
///
/// Owns its configuration, a reusable [`AccumulationWorkspace`] and the
/// random source. Each call to [`run`](Self::run) continues the random
/// stream, so consecutive runs produce independent ensembles.
///
/// # Examples
///
/// ```rust
/// use corrsim_engine::accumulate::{
///     AccumulationConfig, Accumulator, ContributionSpec, GrowthSpec,
/// };
///
/// let config = AccumulationConfig::builder()
///     .time_steps(12)
///     .path_count(4)
///     .growth(GrowthSpec::Deterministic { annual_rate: 0.0, periods_per_year: 12 })
///     .contribution(ContributionSpec::Recurring { amount: 10.0 })
///     .build()
///     .unwrap();
///
/// let mut accumulator = Accumulator::new(config);
/// let ensemble = accumulator.run().unwrap();
/// assert!(ensemble.terminal().iter().all(|&b| (b - 120.0).abs() < 1e-9));
/// ```
#[derive(Debug)]
pub struct Accumulator {
    config: AccumulationConfig,
    workspace: AccumulationWorkspace,
    rng: SimRng,
}

impl Accumulator {
    /// Creates an accumulator seeded from the config, or from entropy when
    /// the config has no seed.
    pub fn new(config: AccumulationConfig) -> Self {
        let rng = config
            .seed()
            .map_or_else(SimRng::from_entropy, SimRng::from_seed);
        Self::with_rng(config, rng)
    }

    /// Creates an accumulator drawing from `rng`.
    pub fn with_rng(config: AccumulationConfig, rng: SimRng) -> Self {
        let workspace = AccumulationWorkspace::new(config.path_count(), config.time_steps());
        Self {
            config,
            workspace,
            rng,
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &AccumulationConfig {
        &self.config
    }

    /// Returns the workspace.
    #[inline]
    pub fn workspace(&self) -> &AccumulationWorkspace {
        &self.workspace
    }

    /// Runs one ensemble.
    ///
    /// Growth factors and contributions for all steps are drawn first (the
    /// draws have no time dependency), then steps are applied strictly in
    /// order with every path of a step processed together.
    ///
    /// # Errors
    ///
    /// `Distribution` if the stochastic growth marginal cannot be rescaled,
    /// `Domain` if a quantile or a shape check fails.
    pub fn run(&mut self) -> Result<PathEnsemble, SimulationError> {
        let steps = self.config.time_steps();
        let paths = self.config.path_count();

        debug!(
            steps,
            paths,
            growth = self.config.growth().mode_name(),
            contribution = self.config.contribution().mode_name(),
            seed = self.rng.seed(),
            "Starting path accumulation"
        );

        self.workspace.ensure_capacity(paths, steps);
        fill_growth(
            self.config.growth(),
            self.workspace.growth_mut(),
            paths,
            &mut self.rng,
        )?;
        fill_contributions(
            self.config.contribution(),
            self.workspace.contributions_mut(),
            paths,
            &mut self.rng,
        )?;

        for t in 0..steps {
            let step = self.workspace.step_buffers(t);
            advance_step(step.previous, step.contributions, step.growth, step.balances)?;
            trace!(step = t, "Completed time step");
        }

        let ensemble = PathEnsemble::new(self.workspace.balances_batch()?, Some(self.rng.seed()));
        debug!(steps, paths, "Path accumulation finished");
        Ok(ensemble)
    }
}

/// Builds an accumulator for `config` and runs it once.
///
/// # Errors
///
/// See [`Accumulator::run`].
pub fn run_accumulation(config: AccumulationConfig) -> Result<PathEnsemble, SimulationError> {
    Accumulator::new(config).run()
}

fn fill_growth(
    growth: &GrowthSpec,
    buffer: &mut [f64],
    paths: usize,
    rng: &mut SimRng,
) -> Result<(), SimulationError> {
    match growth {
        GrowthSpec::Deterministic { .. } => {
            if let Some(factor) = growth.constant_factor() {
                buffer.fill(factor?);
            }
        }
        GrowthSpec::Stochastic { .. } => {
            if let Some(log_returns) = growth.step_log_returns() {
                let log_returns = log_returns?;
                fill_sampled(buffer, paths, rng, &log_returns, f64::exp)?;
            }
        }
        GrowthSpec::Precomputed { factors } => buffer.copy_from_slice(factors.as_slice()),
    }
    Ok(())
}

fn fill_contributions(
    contribution: &ContributionSpec,
    buffer: &mut [f64],
    paths: usize,
    rng: &mut SimRng,
) -> Result<(), SimulationError> {
    match contribution {
        ContributionSpec::None => buffer.fill(0.0),
        ContributionSpec::LumpSum { amount } => {
            let (first, rest) = buffer.split_at_mut(paths.min(buffer.len()));
            first.fill(*amount);
            rest.fill(0.0);
        }
        ContributionSpec::Recurring { amount } => buffer.fill(*amount),
        ContributionSpec::Sampled { marginal } => {
            fill_sampled(buffer, paths, rng, marginal, |x| x)?;
        }
        ContributionSpec::Precomputed { amounts } => buffer.copy_from_slice(amounts.as_slice()),
    }
    Ok(())
}

/// Fills each `[paths]` row with `map(x)`, `x` drawn from `marginal`.
///
/// Every row gets its own stream seed, drawn in step order.
fn fill_sampled<F>(
    buffer: &mut [f64],
    paths: usize,
    rng: &mut SimRng,
    marginal: &MarginalSpec,
    map: F,
) -> Result<(), DomainError>
where
    F: Fn(f64) -> f64 + Sync,
{
    if paths == 0 {
        return Ok(());
    }
    for row in buffer.chunks_mut(paths) {
        let seed = rng.next_stream_seed();
        fill_rows_seeded::<DomainError, _>(row, 1, seed, |chunk_rng, chunk| {
            for value in chunk.iter_mut() {
                *value = map(sample_marginal(marginal, chunk_rng)?);
            }
            Ok(())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::TimeBatch;
    use approx::assert_relative_eq;
    use corrsim_models::marginals::{DriftScaling, Parametric};

    fn deterministic(annual_rate: f64) -> GrowthSpec {
        GrowthSpec::Deterministic {
            annual_rate,
            periods_per_year: 12,
        }
    }

    fn config(steps: usize, paths: usize, growth: GrowthSpec, contribution: ContributionSpec) -> AccumulationConfig {
        AccumulationConfig::builder()
            .time_steps(steps)
            .path_count(paths)
            .seed(42)
            .growth(growth)
            .contribution(contribution)
            .build()
            .unwrap()
    }

    #[test]
    fn test_lump_sum_compounds() {
        let ensemble = run_accumulation(config(
            24,
            3,
            deterministic(0.08),
            ContributionSpec::LumpSum { amount: 100.0 },
        ))
        .unwrap();

        assert_eq!(ensemble.steps(), 24);
        for &b in ensemble.terminal() {
            assert_relative_eq!(b, 100.0 * 1.08_f64.powi(2), max_relative = 1e-12);
        }
        // First step already includes one period of growth.
        let g = 1.08_f64.powf(1.0 / 12.0);
        assert_relative_eq!(ensemble.balances().get(0, 0), 100.0 * g, max_relative = 1e-12);
    }

    #[test]
    fn test_no_contribution_stays_zero() {
        let ensemble = run_accumulation(config(5, 2, deterministic(0.05), ContributionSpec::None)).unwrap();
        assert!(ensemble.balances().as_slice().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_precomputed_inputs() {
        let factors = TimeBatch::from_vec(2, 2, vec![2.0, 1.0, 3.0, 1.0]).unwrap();
        let amounts = TimeBatch::from_vec(2, 2, vec![1.0, 5.0, 1.0, 5.0]).unwrap();
        let ensemble = run_accumulation(config(
            2,
            2,
            GrowthSpec::Precomputed { factors },
            ContributionSpec::Precomputed { amounts },
        ))
        .unwrap();

        // Path 0: (0 + 1) × 2 = 2, then (2 + 1) × 3 = 9.
        // Path 1: 5, then 10.
        assert_eq!(ensemble.terminal(), &[9.0, 10.0]);
    }

    #[test]
    fn test_stochastic_growth_reproducible() {
        let growth = GrowthSpec::Stochastic {
            log_returns: Parametric::normal(0.0003, 0.01).unwrap().into(),
            days_per_period: 21.0,
            drift_scaling: DriftScaling::Linear,
        };
        let cfg = config(12, 2_500, growth, ContributionSpec::Recurring { amount: 1.0 });

        let a = run_accumulation(cfg.clone()).unwrap();
        let b = run_accumulation(cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed(), Some(42));

        // Paths differ from one another.
        let terminal = a.terminal();
        assert!(terminal.iter().any(|&x| (x - terminal[0]).abs() > 1e-9));
        assert!(terminal.iter().all(|&x| x > 0.0 && x.is_finite()));
    }

    #[test]
    fn test_sampled_contributions_mean() {
        let cfg = config(
            1,
            20_000,
            deterministic(0.0),
            ContributionSpec::Sampled {
                marginal: Parametric::uniform(0.0, 2.0).unwrap().into(),
            },
        );
        let ensemble = run_accumulation(cfg).unwrap();
        let mean = ensemble.terminal().iter().sum::<f64>() / 20_000.0;
        assert!((mean - 1.0).abs() < 0.03, "mean = {}", mean);
    }

    #[test]
    fn test_consecutive_runs_differ_and_reuse_workspace() {
        let growth = GrowthSpec::Stochastic {
            log_returns: Parametric::normal(0.0, 0.02).unwrap().into(),
            days_per_period: 1.0,
            drift_scaling: DriftScaling::Linear,
        };
        let mut accumulator = Accumulator::new(config(6, 100, growth, ContributionSpec::Recurring { amount: 1.0 }));
        let first = accumulator.run().unwrap();
        let memory = accumulator.workspace().memory_usage();
        let second = accumulator.run().unwrap();

        assert_ne!(first.terminal(), second.terminal());
        assert_eq!(accumulator.workspace().memory_usage(), memory);
    }

    #[test]
    fn test_with_rng_matches_seeded_config() {
        let cfg = config(3, 10, deterministic(0.03), ContributionSpec::Recurring { amount: 2.0 });
        let a = Accumulator::with_rng(cfg.clone(), SimRng::from_seed(42)).run().unwrap();
        let b = Accumulator::new(cfg).run().unwrap();
        assert_eq!(a, b);
    }
}
